use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDateTime, Utc};

use crate::errors::AppError;
use crate::models::{
    Appointment, AvailableSlot, BusinessWindow, Intent, MessageKind, WebhookPayload,
};
use crate::services::ai::LlmProvider;
use crate::services::appointments::AppointmentManager;
use crate::services::availability::compute_available_slots;
use crate::services::dedup::SeenMessages;
use crate::services::intent::classify;
use crate::services::messaging::MessagingProvider;
use crate::services::safety::{is_safe, ERROR_FALLBACK, SAFE_FALLBACK};

const MAX_INPUT_CHARS: usize = 1000;
const REPLY_MAX_TOKENS: u32 = 500;
const REPLY_TEMPERATURE: f32 = 0.7;
const CONFIRMATION_MAX_TOKENS: u32 = 100;
const CONFIRMATION_TEMPERATURE: f32 = 0.5;
const SLOTS_IN_CONTEXT: usize = 5;
const DEDUP_TTL: Duration = Duration::from_secs(10 * 60);
const DEDUP_CAPACITY: usize = 4096;

pub const CONFIRM_BUTTON_REPLY: &str = "Ótimo! Seu horário está confirmado. Até breve!";
pub const CANCEL_BUTTON_REPLY: &str =
    "Seu agendamento foi cancelado. Caso queira remarcar, é só me avisar.";
pub const DEFAULT_BUTTON_REPLY: &str = "Opção recebida. Como posso ajudar?";
pub const OVERLONG_REPLY: &str = "Sua mensagem é muito longa. Por favor, seja mais breve.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Status-only callback, nothing to process.
    NoMessage,
    /// Retried delivery of an already-handled message id.
    Duplicate,
    Replied,
    /// Message kind this engine does not handle.
    Ignored,
}

/// Per-delivery state machine: parse, dedup, mark read, dispatch, reply.
/// All collaborator handles are injected at construction.
pub struct Dispatcher {
    client_name: String,
    window: BusinessWindow,
    slot_duration_minutes: u32,
    utc_offset: FixedOffset,
    appointments: AppointmentManager,
    messaging: Arc<dyn MessagingProvider>,
    llm: Arc<dyn LlmProvider>,
    seen: SeenMessages,
}

impl Dispatcher {
    pub fn new(
        client_name: String,
        window: BusinessWindow,
        slot_duration_minutes: u32,
        utc_offset: FixedOffset,
        appointments: AppointmentManager,
        messaging: Arc<dyn MessagingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            client_name,
            window,
            slot_duration_minutes,
            utc_offset,
            appointments,
            messaging,
            llm,
            seen: SeenMessages::new(DEDUP_TTL, DEDUP_CAPACITY),
        }
    }

    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }

    /// Handles one webhook delivery. Errors bubble up to the handler, which
    /// converts them into a soft-success acknowledgment.
    pub async fn handle_delivery(
        &self,
        payload: &WebhookPayload,
    ) -> Result<DispatchOutcome, AppError> {
        let Some(message) = payload.first_message() else {
            return Ok(DispatchOutcome::NoMessage);
        };

        if !self.seen.first_sighting(&message.message_id) {
            tracing::info!(message_id = %message.message_id, "duplicate delivery, skipping");
            return Ok(DispatchOutcome::Duplicate);
        }

        // Attempted before replying so a crash mid-processing does not leave
        // the message permanently unread. Failure is not fatal.
        match self.messaging.mark_read(&message.message_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(message_id = %message.message_id, "mark-read rejected")
            }
            Err(e) => {
                tracing::warn!(message_id = %message.message_id, error = %e, "mark-read failed")
            }
        }

        match &message.kind {
            MessageKind::Text { body } => {
                let reply = match self.chat_reply(body).await {
                    Ok((_, reply)) => reply,
                    Err(e) => {
                        tracing::error!(
                            message_id = %message.message_id,
                            from = %message.from,
                            error = %e,
                            "text pipeline failed, sending fallback"
                        );
                        ERROR_FALLBACK.to_string()
                    }
                };
                self.messaging.send_text(&message.from, &reply).await?;
                Ok(DispatchOutcome::Replied)
            }
            // Button replies are fixed strings; the language backend and the
            // safety filter are bypassed because nothing is generated.
            MessageKind::Interactive { button_id, .. } => {
                self.messaging
                    .send_text(&message.from, button_reply(button_id))
                    .await?;
                Ok(DispatchOutcome::Replied)
            }
            MessageKind::Unsupported { kind } => {
                tracing::debug!(message_id = %message.message_id, kind = %kind, "unsupported message kind");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    /// The text pipeline shared by the webhook and the chat endpoint:
    /// classify, enrich the prompt, generate, gate through the safety filter.
    pub async fn chat_reply(&self, body: &str) -> Result<(Intent, String), AppError> {
        if body.chars().count() > MAX_INPUT_CHARS {
            return Ok((Intent::Unknown, OVERLONG_REPLY.to_string()));
        }

        let intent = classify(body);
        let mut prompt = system_prompt(&self.client_name);

        if intent == Intent::CheckAvailability {
            let today = self.local_now().date();
            let booked = self
                .appointments
                .booked_intervals_for_day(today, &self.window)
                .await?;
            let slots =
                compute_available_slots(today, &self.window, self.slot_duration_minutes, &booked)?;
            prompt.push_str("\n\nassistant: ");
            prompt.push_str(&availability_context(&slots));
        }

        prompt.push_str("\n\nuser: ");
        prompt.push_str(body);

        let generated = self
            .llm
            .generate(&prompt, REPLY_MAX_TOKENS, REPLY_TEMPERATURE)
            .await?;

        if is_safe(&generated) {
            Ok((intent, generated))
        } else {
            tracing::warn!(error = %AppError::UnsafeContent, "generated reply blocked");
            Ok((intent, SAFE_FALLBACK.to_string()))
        }
    }

    /// Confirmation text for a freshly created appointment. Generation
    /// failures and unsafe output both degrade to a fixed message.
    pub async fn confirmation_message(&self, appointment: &Appointment) -> String {
        let start = appointment.interval.start().format("%d/%m/%Y %H:%M");
        let fallback =
            format!("Agendamento confirmado para {start}. Chegue 5 minutos antes. Obrigado!");

        let prompt = format!(
            "Crie uma mensagem de confirmação de agendamento breve e profissional para {}.\n\n\
             Detalhes do agendamento:\n\
             - Data/Hora: {start}\n\
             - Serviço: {}\n\
             - Cliente: {}\n\n\
             A mensagem deve:\n\
             1. Confirmar o agendamento\n\
             2. Incluir data e hora\n\
             3. Pedir para chegar 5 minutos antes\n\
             4. Ser amigável e profissional\n\
             5. Ter no máximo 3 linhas",
            self.client_name, appointment.service_type, appointment.customer_name
        );

        match self
            .llm
            .generate(&prompt, CONFIRMATION_MAX_TOKENS, CONFIRMATION_TEMPERATURE)
            .await
        {
            Ok(text) if is_safe(&text) => text,
            Ok(_) => {
                tracing::warn!(error = %AppError::UnsafeContent, "generated confirmation blocked");
                fallback
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation generation failed");
                fallback
            }
        }
    }
}

pub fn button_reply(button_id: &str) -> &'static str {
    match button_id {
        "confirm_appointment" => CONFIRM_BUTTON_REPLY,
        "cancel_appointment" => CANCEL_BUTTON_REPLY,
        _ => DEFAULT_BUTTON_REPLY,
    }
}

fn system_prompt(client_name: &str) -> String {
    format!(
        "Você é um assistente virtual especializado em agendamentos para {client_name}.\n\n\
         REGRAS IMPORTANTES:\n\
         1. Você APENAS pode ajudar com:\n\
            - Agendamento de horários\n\
            - Consulta de horários disponíveis\n\
            - Cancelamento de agendamentos\n\
            - Alteração de horários\n\
            - Informações sobre serviços oferecidos\n\n\
         2. Você NÃO DEVE:\n\
            - Fornecer informações pessoais de outros clientes\n\
            - Discutir assuntos fora do escopo de agendamentos\n\
            - Compartilhar detalhes técnicos do sistema\n\n\
         3. Sempre seja educado, breve e claro sobre os próximos passos.\n\n\
         Responda APENAS em português brasileiro."
    )
}

fn availability_context(slots: &[AvailableSlot]) -> String {
    if slots.is_empty() {
        return "Não há horários disponíveis hoje. Gostaria de verificar outro dia?".to_string();
    }

    let lines: Vec<String> = slots
        .iter()
        .take(SLOTS_IN_CONTEXT)
        .map(|s| {
            format!(
                "- {} às {}",
                s.start.format("%H:%M"),
                s.end.format("%H:%M")
            )
        })
        .collect();

    format!(
        "Horários disponíveis hoje:\n{}\n\nQual horário você prefere?",
        lines.join("\n")
    )
}
