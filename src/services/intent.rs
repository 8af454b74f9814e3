use crate::models::Intent;

/// Keyword table in fixed priority order. The first row with any substring
/// match wins, so a message carrying both a scheduling and a cancellation
/// verb always resolves to `Schedule`.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Schedule, &["agendar", "marcar", "reservar"]),
    (
        Intent::CheckAvailability,
        &["disponível", "livre", "vago", "tem horário"],
    ),
    (Intent::Cancel, &["cancelar", "desmarcar", "desistir"]),
    (
        Intent::Reschedule,
        &["remarcar", "mudar", "alterar", "trocar"],
    ),
    (
        Intent::ListAppointments,
        &["meus horários", "minhas marcações", "agendamentos"],
    ),
];

/// Deterministic keyword classification. Matching is substring-based over
/// the lower-cased message, not word-boundary based.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *intent;
        }
    }
    Intent::Unknown
}

#[cfg(test)]
mod tests {
    use super::classify;
    use crate::models::Intent;

    #[test]
    fn test_cancel_message() {
        assert_eq!(classify("quero cancelar meu horário"), Intent::Cancel);
    }

    #[test]
    fn test_schedule_wins_priority_tie_break() {
        assert_eq!(classify("quero agendar e depois cancelar"), Intent::Schedule);
    }

    #[test]
    fn test_check_availability() {
        assert_eq!(classify("tem horário livre amanhã?"), Intent::CheckAvailability);
        assert_eq!(classify("algum horário disponível?"), Intent::CheckAvailability);
    }

    #[test]
    fn test_reschedule() {
        assert_eq!(classify("preciso mudar meu atendimento"), Intent::Reschedule);
    }

    #[test]
    fn test_list_appointments() {
        assert_eq!(classify("quais são meus horários?"), Intent::ListAppointments);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("bom dia!"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("QUERO AGENDAR"), Intent::Schedule);
        assert_eq!(classify("DisponíVEL?"), Intent::CheckAvailability);
    }

    #[test]
    fn test_substring_inside_larger_word_matches() {
        // "remarcar" contains "marcar", and Schedule outranks Reschedule.
        assert_eq!(classify("remarcar"), Intent::Schedule);
    }

    #[test]
    fn test_deterministic() {
        let message = "gostaria de reservar um atendimento";
        assert_eq!(classify(message), classify(message));
        assert_eq!(classify(message), Intent::Schedule);
    }
}
