//! 输出清理
//!
//! 模型有时仍会把整个回复包在代码块里，这里去掉前两处围栏行

use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

/// 围栏标记及其所在行的剩余部分（含换行）
static RE_FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```.*\n").unwrap());

/// 清理生成的文档
///
/// 首次与最后一次出现的 ```` ``` ```` 位置不同时（允许重叠，
/// 单独一行 ```` ```` ```` 也算），删除前两处围栏行；否则原样返回
pub fn clean_content(contents: &str) -> String {
    if contents.find(FENCE) == contents.rfind(FENCE) {
        return contents.to_string();
    }

    RE_FENCE_LINE.replacen(contents, 2, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_wrapping_fence() {
        let input = "```markdown\n## Foo\n\n**Summary:** bar\n```\nDefinition:\n";
        assert_eq!(clean_content(input), "## Foo\n\n**Summary:** bar\nDefinition:\n");
    }

    #[test]
    fn test_strips_first_two_occurrences_only() {
        let input = "intro\n```rust\nlet a = 1;\n```\ntext\n```\nmore\n```\n";
        assert_eq!(
            clean_content(input),
            "intro\nlet a = 1;\ntext\n```\nmore\n```\n"
        );
    }

    #[test]
    fn test_identity_below_two_fences() {
        assert_eq!(clean_content(""), "");
        assert_eq!(clean_content("## Foo\nplain text\n"), "## Foo\nplain text\n");
        assert_eq!(clean_content("```md\n## Foo\n"), "```md\n## Foo\n");
    }

    #[test]
    fn test_fence_without_trailing_newline_is_kept() {
        let input = "```md\n## Foo\n```";
        assert_eq!(clean_content(input), "## Foo\n```");
    }

    #[test]
    fn test_idempotent_on_generated_documents() {
        let inputs = [
            "## Foo\n",
            "```\n## Foo\n",
            "```markdown\n## Foo\n```\n\nDefinition:\n[Foo.cs](</src/Foo.cs>)\n",
            "```md\n# A\n```\n`inline` code\n```\n",
        ];
        for input in inputs {
            let once = clean_content(input);
            assert_eq!(clean_content(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_four_backtick_line_counts_as_two_delimiters() {
        assert_eq!(clean_content("````\nbody\n"), "body\n");
    }

    #[test]
    fn test_each_pass_strips_two_more_fences() {
        let input = "```markdown\n## Foo\n```rust\nlet a = 1;\n```\n```\n";

        let once = clean_content(input);
        assert_eq!(once, "## Foo\nlet a = 1;\n```\n```\n");

        let twice = clean_content(&once);
        assert_eq!(twice, "## Foo\nlet a = 1;\n");
        assert_ne!(twice, once);

        assert_eq!(clean_content(&twice), twice);
    }
}
