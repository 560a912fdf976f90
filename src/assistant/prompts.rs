/// Builds the follow-up prompt asking the model to repair a failed query.
pub fn correction_prompt(user_query: &str, failed_sql: &str, error_message: &str) -> String {
    format!(
        r#"
### TASK ###
You are an ANSI SQL expert with strong debugging skills.

The SQL query below was generated for the user's question and failed with the error shown.
Write a corrected query for DuckDB that keeps the original meaning.

### QUESTION ###
Question asked by the user: {user_query}
GENERATED SQL: {failed_sql}
ERROR MESSAGE: {error_message}

### FINAL ANSWER FORMAT ###
Answer with the corrected query as a JSON object only:

{{
    "sql": "<CORRECTED_SQL_QUERY_STRING>"
}}
"#
    )
}
