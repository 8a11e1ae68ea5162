/// Reduce raw `zpool status` output to the topology token list.
///
/// Only lines of the `config:` table are kept (they are the only lines that
/// start with a tab), each reduced to its first whitespace-separated token.
/// The first kept line is the `NAME STATE READ WRITE CKSUM` header and is
/// dropped, so the result starts with the pool name. Output for a missing
/// pool has no tab-indented lines and yields an empty list.
pub fn extract_topology_tokens(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.starts_with('\t'))
        .filter_map(|line| line.split_whitespace().next())
        .skip(1)
        .map(str::to_owned)
        .collect()
}
