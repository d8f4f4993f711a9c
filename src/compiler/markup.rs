//! 歌词标记的编辑辅助。
//!
//! 服务于标记编辑界面：取光标处的单词，以及把一个单词的斜杠切分
//! 推广到全文中的所有等价出现。

/// 单词之间的分界字符：空格、换行和下划线。
fn is_boundary_char(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '_')
}

/// 返回光标所在的单词。
///
/// `cursor` 是按字符计的位置，向两侧扩展到最近的分界字符为止。
#[must_use]
pub fn current_word_at(body: &str, cursor: usize) -> String {
    let chars: Vec<char> = body.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut left = cursor;
    while left > 0 && !is_boundary_char(chars[left - 1]) {
        left -= 1;
    }
    let mut right = cursor;
    while right < chars.len() && !is_boundary_char(chars[right]) {
        right += 1;
    }

    chars[left..right].iter().collect()
}

/// 在 `word` 中按 `template` 的斜杠位置插入斜杠。
///
/// 先去掉 `word` 原有的斜杠，再把 `template` 中每个斜杠所在的
/// 字符位置原样套过来。
fn add_slashes(word: &str, template: &str) -> String {
    let mut result: Vec<char> = word.chars().filter(|&ch| ch != '/').collect();
    for (index, ch) in template.chars().enumerate() {
        if ch == '/' {
            let index = index.min(result.len());
            result.insert(index, '/');
        }
    }
    result.into_iter().collect()
}

/// 判断两个单词是否等价：忽略大小写和 `/ , ! —` 这些标记字符。
fn words_equivalent(word: &str, other: &str) -> bool {
    fn normalize(word: &str) -> String {
        word.to_lowercase()
            .chars()
            .filter(|ch| !matches!(ch, '/' | ',' | '!' | '—'))
            .collect()
    }
    normalize(word) == normalize(other)
}

/// 把 `word` 的斜杠切分推广到 `lyrics` 中所有等价的出现。
///
/// 例如把所有 "alchemy" 都替换为 "al/chem/y"，保留原有的大小写
/// 和单词之间的分界字符。
#[must_use]
pub fn slashify_all_occurrences(lyrics: &str, word: &str, slashed_version: &str) -> String {
    fn append_word(result: &mut String, current_word: &str, word: &str, slashed_version: &str) {
        if words_equivalent(current_word, word) {
            result.push_str(&add_slashes(current_word, slashed_version));
        } else {
            result.push_str(current_word);
        }
    }

    let mut result = String::new();
    let mut current_word = String::new();
    for ch in lyrics.chars() {
        if is_boundary_char(ch) {
            append_word(&mut result, &current_word, word, slashed_version);
            current_word.clear();
            result.push(ch);
        } else {
            current_word.push(ch);
        }
    }
    append_word(&mut result, &current_word, word, slashed_version);

    result
}
