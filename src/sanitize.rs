/// Drop every character outside the ASCII range, keeping the rest in order.
///
/// Lossy and one-way: nothing is replaced or escaped, so an all-emoji message
/// folds to an empty string.
pub fn ascii_fold(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}
