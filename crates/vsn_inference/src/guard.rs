use vsn_core::models::SQL_ERROR_PREFIX;

pub const INVALID_SELECT: &str = "ERROR: La consulta generada no es un SELECT válido.";

/// `ERROR: <detail>`.
pub fn error_message(detail: impl std::fmt::Display) -> String {
    format!("{}: {}", SQL_ERROR_PREFIX, detail)
}

/// Removes a surrounding markdown code fence (```sql ... ```), if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Passes generator output through only when it is a `SELECT` statement.
pub fn validate_select(raw: &str) -> String {
    let sql = strip_code_fences(raw);
    let is_select = sql
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SELECT"));

    if is_select {
        sql.to_string()
    } else {
        INVALID_SELECT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_passes_trimmed() {
        assert_eq!(
            validate_select("  SELECT telefono FROM telefonos_de_interes;\n"),
            "SELECT telefono FROM telefonos_de_interes;"
        );
        assert_eq!(validate_select("select 1"), "select 1");
    }

    #[test]
    fn test_non_select_is_rejected() {
        assert_eq!(validate_select("DELETE FROM telefonos_de_interes;"), INVALID_SELECT);
        assert_eq!(validate_select("ERROR"), INVALID_SELECT);
        assert_eq!(validate_select(""), INVALID_SELECT);
        assert_eq!(validate_select("SELEC"), INVALID_SELECT);
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let fenced = "```sql\nSELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%cap%';\n```";
        assert_eq!(
            validate_select(fenced),
            "SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%cap%';"
        );
        assert_eq!(strip_code_fences("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_multibyte_output_does_not_panic() {
        assert_eq!(validate_select("Sé"), INVALID_SELECT);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message("timeout"), "ERROR: timeout");
    }
}
