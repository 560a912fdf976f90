// Formatting artifacts models wrap around their JSON, removed in this order
const ARTIFACTS: [&str; 4] = ["```sql", "```json", "\"\"\"", "```"];

/// Cleans raw model output so it can be decoded as JSON.
///
/// Whitespace runs collapse to single spaces first, then escaped newlines,
/// code fences, triple quotes and every `;` are removed. Removal repeats
/// until nothing changes, since dropping a `;` can join backticks into a new
/// fence. It can leave the spaces that surrounded a fence in place.
pub fn clean_generation_result(raw: &str) -> String {
    let mut cleaned = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("\\n", " ");

    loop {
        let mut next = cleaned.clone();
        for artifact in ARTIFACTS {
            next = next.replace(artifact, "");
        }
        next = next.replace(';', "");

        if next == cleaned {
            return cleaned;
        }
        cleaned = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_json_fence_and_semicolon() {
        let raw = "```json\n{\"sql\": \"SELECT * FROM airports;\"}\n```";
        assert_eq!(
            clean_generation_result(raw),
            " {\"sql\": \"SELECT * FROM airports\"} "
        );
    }

    #[test]
    fn test_plain_json_only_loses_semicolon() {
        let raw = "{\"sql\": \"SELECT * FROM airlines;\"}";
        assert_eq!(
            clean_generation_result(raw),
            "{\"sql\": \"SELECT * FROM airlines\"}"
        );
    }

    #[test]
    fn test_strips_bare_fence() {
        let raw = "```\n{\"sql\": \"SELECT * FROM flights LIMIT 1;\"}\n```";
        assert_eq!(
            clean_generation_result(raw),
            " {\"sql\": \"SELECT * FROM flights LIMIT 1\"} "
        );
    }

    #[test]
    fn test_removes_sql_fence_triple_quotes_and_escaped_newlines() {
        let raw = "```sql\n\"\"\"{\"sql\":\\n \"SELECT  a.airline\\nFROM airlines a;\"}\"\"\"\n```";
        let cleaned = clean_generation_result(raw);

        for artifact in ["```sql", "```json", "```", "\"\"\"", "\\n", ";"] {
            assert!(!cleaned.contains(artifact), "{:?} left in {:?}", artifact, cleaned);
        }
        let parsed: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(parsed["sql"], "SELECT a.airline FROM airlines a");
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        let raw = "  {\"sql\":\t\"SELECT\n\n  *   FROM airlines\"}  ";
        assert_eq!(
            clean_generation_result(raw),
            "{\"sql\": \"SELECT * FROM airlines\"}"
        );
    }

    #[test]
    fn test_second_pass_only_touches_whitespace() {
        let inputs = [
            "```json\n{\"sql\": \"SELECT * FROM airports;\"}\n```",
            "```sql\n{\"sql\": \"SELECT COUNT(*) AS total FROM flights;\"}```",
            "\"\"\"{\"sql\": \"SELECT 1;\"}\"\"\"",
            "{\"sql\": \"SELECT * FROM airlines;\"}",
        ];

        for raw in inputs {
            let once = clean_generation_result(raw);
            let twice = clean_generation_result(&once);
            assert_eq!(twice, once.trim(), "input {:?}", raw);
            assert_eq!(clean_generation_result(&twice), twice);
        }
    }

    #[test]
    fn test_fence_formed_by_dropped_semicolon_is_removed() {
        let raw = "``;`{\"sql\": \"SELECT 1;\"}";
        let once = clean_generation_result(raw);
        assert_eq!(once, "{\"sql\": \"SELECT 1\"}");
        assert_eq!(clean_generation_result(&once), once);
    }

    #[test]
    fn test_total_over_odd_inputs() {
        assert_eq!(clean_generation_result(""), "");
        assert_eq!(clean_generation_result(" \n\t "), "");
        assert_eq!(clean_generation_result("```"), "");
        assert_eq!(clean_generation_result("héllo ✈ wörld"), "héllo ✈ wörld");
    }
}
