/// 字母表大小：{0:$, 1:A, 2:C, 3:G, 4:T, 5:N}
/// 0 只作为 FM 索引文本末尾的哨兵出现，参考序列与查询中不会出现。
pub const SIGMA: usize = 6;

/// 哨兵字符编码
pub const SENTINEL: u8 = 0;

/// 通配符 N 的编码
pub const WILDCARD: u8 = 5;

#[inline]
pub fn to_alphabet(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => 1,
        b'C' => 2,
        b'G' => 3,
        b'T' | b'U' => 4,
        _ => WILDCARD, // 其余字符一律视为 N
    }
}

#[inline]
pub fn from_alphabet(a: u8) -> u8 {
    match a {
        0 => b'$',
        1 => b'A',
        2 => b'C',
        3 => b'G',
        4 => b'T',
        _ => b'N',
    }
}

/// 将 ASCII 序列编码为数值字母表（1..=5）。
pub fn encode(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| to_alphabet(b)).collect()
}

/// 将数值字母表解码回 ASCII。
pub fn decode(codes: &[u8]) -> Vec<u8> {
    codes.iter().map(|&a| from_alphabet(a)).collect()
}

/// 编码是否为合法的文本符号（不含哨兵）
#[inline]
pub fn is_symbol(a: u8) -> bool {
    (1..SIGMA as u8).contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_maps_lowercase_and_unknown() {
        assert_eq!(encode(b"acgtu"), vec![1, 2, 3, 4, 4]);
        assert_eq!(encode(b"NRY-"), vec![5, 5, 5, 5]);
    }

    #[test]
    fn decode_inverts_encode_on_canonical_bases() {
        assert_eq!(decode(&encode(b"ACGTN")), b"ACGTN");
        assert_eq!(from_alphabet(SENTINEL), b'$');
    }

    #[test]
    fn symbol_order_follows_codes() {
        let codes = encode(b"ACGTN");
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
        assert!(codes.iter().all(|&c| is_symbol(c)));
        assert!(!is_symbol(SENTINEL));
    }
}
