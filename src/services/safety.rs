/// Topic markers that must never appear in a generated reply. Substring
/// containment over the lower-cased text; false negatives are a known
/// limitation of this filter.
const DENY_LIST: &[&str] = &[
    "dados pessoais",
    "informação confidencial",
    "outros clientes",
    "sistema interno",
    "senha",
    "credencial",
    "api key",
    "banco de dados",
];

/// Fixed reply used whenever generated text is rejected.
pub const SAFE_FALLBACK: &str =
    "Desculpe, só posso ajudar com agendamentos. Como posso ajudá-lo com isso?";

/// Fixed reply used when processing fails outright.
pub const ERROR_FALLBACK: &str = "Desculpe, ocorreu um erro. Por favor, tente novamente.";

pub fn is_safe(text: &str) -> bool {
    let lower = text.to_lowercase();
    !DENY_LIST.iter().any(|marker| lower.contains(marker))
}
