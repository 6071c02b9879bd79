use async_trait::async_trait;

use super::process::{CommandTemplate, ProcessSlot};
use super::{Completion, SpeechSynthesizer, Utterance};
use crate::error::Result;

/// Words per minute the system voices use at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 180.0;

/// Built-in speech through the operating system's synthesizer
/// (`say` on macOS, `espeak-ng` elsewhere).
pub struct SystemSpeech {
    template: CommandTemplate,
    slot: ProcessSlot,
}

impl SystemSpeech {
    pub fn new(template: CommandTemplate) -> Self {
        Self {
            template,
            slot: ProcessSlot::new(),
        }
    }

    pub fn default_template() -> CommandTemplate {
        if cfg!(target_os = "macos") {
            CommandTemplate::new("say", &["-r", "{wpm}"])
        } else {
            CommandTemplate::new(
                "espeak-ng",
                &["--stdin", "-v", "{voice}", "-s", "{wpm}", "-p", "{pitch}", "-a", "{amplitude}"],
            )
        }
    }
}

/// espeak voice names are lowercase language tags; English needs its region.
fn espeak_voice(locale: &str) -> String {
    let lower = locale.to_lowercase();
    if lower.starts_with("en") {
        return lower;
    }
    lower.split('-').next().unwrap_or("en").to_string()
}

pub(crate) fn prosody_args(utterance: &Utterance) -> Vec<(&'static str, String)> {
    vec![
        ("voice", espeak_voice(&utterance.locale)),
        ("locale", utterance.locale.clone()),
        ("wpm", format!("{}", (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32)),
        ("pitch", format!("{}", (50.0 * utterance.pitch).round() as u32)),
        ("amplitude", format!("{}", (100.0 * utterance.volume).round() as u32)),
    ]
}

#[async_trait]
impl SpeechSynthesizer for SystemSpeech {
    fn is_speaking(&self) -> bool {
        self.slot.is_running()
    }

    fn cancel(&self) {
        self.slot.cancel();
    }

    async fn speak(&self, utterance: &Utterance) -> Result<Completion> {
        let args = prosody_args(utterance);
        let values: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let command = self.template.build(&values);

        tracing::info!("Speaking {} chars with {} ({})", utterance.text.len(), self.template.program, utterance.locale);
        self.slot.run(command, Some(&utterance.text)).await
    }
}
