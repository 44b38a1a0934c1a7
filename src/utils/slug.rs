//! 游戏 slug 生成
//!
//! 中文字符转为拼音，常见带重音的拉丁字母去掉重音，
//! 其余非字母数字字符折叠为单个连字符。

use pinyin::ToPinyin;

/// 生成 URL 友好的 slug
pub fn slugify(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if let Some(py) = c.to_pinyin() {
            // 每个汉字独立成词
            flush_word(&mut current, &mut words);
            words.push(py.plain().to_string());
            continue;
        }

        let folded = fold_accent(c);
        if folded.is_ascii_alphanumeric() {
            current.push(folded.to_ascii_lowercase());
        } else if c == '\'' || c == '’' {
            // 撇号不产生分隔（l'aventure -> laventure）
        } else {
            flush_word(&mut current, &mut words);
        }
    }
    flush_word(&mut current, &mut words);

    words.join("-")
}

fn flush_word(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        other => other,
    }
}
