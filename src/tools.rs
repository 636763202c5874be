pub(crate) mod hashing;
mod secret;

pub(crate) use secret::Secret;

/// XORs `mask` into `data` in place. Both slices must have the same length.
pub(crate) fn xor_in_place(data: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(data.len(), mask.len());
    data.iter_mut().zip(mask).for_each(|(byte, mask_byte)| *byte ^= mask_byte);
}
