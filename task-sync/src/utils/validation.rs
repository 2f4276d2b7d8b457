// task-sync/src/utils/validation.rs

pub mod common;

/// カンマ区切りのタグ入力を正規化（空要素と重複を除去、入力順は維持）
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split([',', '，']).map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
