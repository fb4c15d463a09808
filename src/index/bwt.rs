use crate::util::dna::SENTINEL;

/// 根据后缀数组构建 BWT：bwt[i] = text[sa[i] - 1]（循环取前一字符）。
/// text 必须以唯一的哨兵 0 结尾，否则 LF 映射不成立。
pub fn build_bwt(text: &[u8], sa: &[u32]) -> Vec<u8> {
    let Some(&last) = text.last() else {
        return Vec::new();
    };
    assert_eq!(last, SENTINEL, "BWT text must end with the sentinel");
    sa.iter()
        .map(|&p| match p as usize {
            0 => last,
            i => text[i - 1],
        })
        .collect()
}
