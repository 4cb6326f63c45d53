/// Constant-time byte comparison to keep code and token checks free of
/// timing side channels. Length mismatch returns early; lengths of the
/// values compared here are public.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}
