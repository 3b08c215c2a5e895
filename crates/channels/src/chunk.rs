/// Outbound chunk size, kept under Discord's 2000-character message limit.
pub const MAX_MESSAGE_LEN: usize = 1900;

/// Split `text` into consecutive pieces of at most `max_len` characters.
///
/// Pieces are cut at fixed character offsets; concatenated, they reproduce
/// the input. Empty input (or `max_len == 0`) yields no chunks.
pub fn chunk_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_len {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
