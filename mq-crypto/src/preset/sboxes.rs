use crate::sbox::SBox;

use lazy_static::lazy_static;

lazy_static! {
    /// The 4-bit S-box of the PRESENT block cipher.
    pub static ref PRESENT_SBOX: SBox = SBox::try_with(
        vec![
            0xC, 0x5, 0x6, 0xB, 0x9, 0x0, 0xA, 0xD, 0x3, 0xE, 0xF, 0x8, 0x4, 0x7, 0x1, 0x2,
        ],
        4,
        4,
    )
    .expect("PRESENT S-box table is well-formed");

    /// The 3-bit S-box of PRINTcipher.
    pub static ref PRINTCIPHER_SBOX: SBox =
        SBox::try_with(vec![0, 1, 3, 6, 7, 4, 5, 2], 3, 3)
            .expect("PRINTcipher S-box table is well-formed");
}
