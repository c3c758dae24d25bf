/// Derive an identifier-safe tag fragment from a type expression or name.
///
/// Pointer stars become `P`, every other non-alphanumeric character becomes
/// an underscore. Tags are spliced into generated helper names
/// (`_write__<tag>`) and loop variables, so they must be valid C identifier
/// fragments.
///
/// # Examples
/// ```
/// use tracegen_model::utils::sanitize_tag;
/// assert_eq!(sanitize_tag("unsigned int"), "unsigned_int");
/// assert_eq!(sanitize_tag("char *"), "charP");
/// assert_eq!(sanitize_tag("D3DMATRIX"), "D3DMATRIX");
/// ```
pub fn sanitize_tag(expr: &str) -> String {
    let expr = expr.replace(" *", "P").replace('*', "P");
    expr.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
