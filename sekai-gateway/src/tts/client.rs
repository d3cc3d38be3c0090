use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sekai_core::{Language, Secrets, TtsSettings};

use super::sentences::split_sentences;
use super::voices::{ChirpVoice, random_chirp, random_gemini_speaker};
use super::{SpeechSynthesizer, TtsError};

const DEFAULT_STYLE_PROMPT: &str = "Say the following.";

/// How requests authenticate.
#[derive(Clone)]
pub enum TtsAuth {
    /// `?key=` query parameter
    ApiKey(String),
    /// OAuth access token in the Authorization header
    Bearer(String),
}

impl TtsAuth {
    /// Bearer token wins over an API key when both are set.
    pub fn from_secrets(secrets: &Secrets) -> Option<Self> {
        secrets
            .google_access_token
            .clone()
            .map(Self::Bearer)
            .or_else(|| secrets.google_tts_api_key.clone().map(Self::ApiKey))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voice {
    Gemini { speaker: &'static str },
    Chirp(&'static ChirpVoice),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml_gender: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Clone)]
pub struct GoogleTtsClient {
    http_client: reqwest::Client,
    auth: TtsAuth,
    settings: TtsSettings,
}

impl GoogleTtsClient {
    pub fn new(auth: TtsAuth, settings: TtsSettings) -> Result<Self, TtsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http_client,
            auth,
            settings,
        })
    }

    /// A Gemini speaker when Gemini synthesis is enabled, else a Chirp voice.
    pub fn pick_voice(&self, language: Language) -> Voice {
        if self.settings.gemini_enabled() {
            Voice::Gemini {
                speaker: random_gemini_speaker(),
            }
        } else {
            Voice::Chirp(random_chirp(language))
        }
    }

    fn build_request<'a>(
        &'a self,
        text: &'a str,
        language: Language,
        voice: Voice,
    ) -> SynthesizeRequest<'a> {
        let audio_encoding = self.settings.audio_encoding.as_str();
        match voice {
            Voice::Gemini { speaker } => {
                let prompt = match self.settings.style_prompt.trim() {
                    "" => DEFAULT_STYLE_PROMPT,
                    p => p,
                };
                SynthesizeRequest {
                    input: SynthesisInput {
                        prompt: Some(prompt),
                        text,
                    },
                    voice: VoiceSelection {
                        language_code: language.speech_code().to_lowercase(),
                        name: speaker,
                        ssml_gender: None,
                        model_name: Some(self.settings.model_name.as_str()),
                    },
                    audio_config: AudioConfig {
                        audio_encoding,
                        speaking_rate: 1.0,
                        pitch: 0.0,
                    },
                }
            }
            Voice::Chirp(chirp) => SynthesizeRequest {
                input: SynthesisInput { prompt: None, text },
                voice: VoiceSelection {
                    language_code: language.speech_code().to_string(),
                    name: chirp.name,
                    ssml_gender: Some(chirp.gender.as_str()),
                    model_name: None,
                },
                audio_config: AudioConfig {
                    audio_encoding,
                    speaking_rate: chirp.speaking_rate,
                    pitch: chirp.pitch,
                },
            },
        }
    }

    async fn post(&self, request: &SynthesizeRequest<'_>) -> Result<Vec<u8>, TtsError> {
        let mut builder = self.http_client.post(&self.settings.endpoint).json(request);
        match &self.auth {
            TtsAuth::ApiKey(key) => builder = builder.query(&[("key", key)]),
            TtsAuth::Bearer(token) => {
                if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                    builder = builder.header(AUTHORIZATION, value);
                }
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TtsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        decode_audio(&body)
    }

    /// Synthesize with `voice`; a failed Gemini request is retried once with
    /// a random Chirp voice for the language.
    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
        voice: Voice,
    ) -> Result<Vec<u8>, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        let result = self.post(&self.build_request(text, language, voice)).await;
        match (result, voice) {
            (Ok(audio), _) => Ok(audio),
            (Err(e), Voice::Gemini { speaker }) => {
                let fallback = random_chirp(language);
                warn!(
                    "Gemini TTS failed with speaker {}, falling back to {}: {}",
                    speaker, fallback.name, e
                );
                self.post(&self.build_request(text, language, Voice::Chirp(fallback)))
                    .await
            }
            (Err(e), Voice::Chirp(_)) => Err(e),
        }
    }
}

fn decode_audio(body: &str) -> Result<Vec<u8>, TtsError> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| TtsError::InvalidFormat(format!("Failed to parse synthesize response: {e}")))?;
    let content = response
        .audio_content
        .ok_or_else(|| TtsError::InvalidFormat("response has no audioContent".to_string()))?;
    Ok(STANDARD.decode(content)?)
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn speak(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError> {
        let voice = self.pick_voice(language);
        self.synthesize(text, language, voice).await
    }

    async fn speak_long(&self, text: &str, language: Language) -> Result<Vec<u8>, TtsError> {
        let voice = self.pick_voice(language);
        if text.chars().count() <= self.settings.max_single_request_chars {
            return self.synthesize(text, language, voice).await;
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(TtsError::EmptyText);
        }
        debug!(
            "synthesizing {} chars as {} sentences",
            text.chars().count(),
            sentences.len()
        );
        let mut audio = Vec::new();
        for sentence in sentences {
            audio.extend(self.synthesize(sentence, language, voice).await?);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::voices::{ENGLISH_VOICES, JAPANESE_VOICES};
    use sekai_core::TtsEngine;

    fn client(engine: TtsEngine) -> GoogleTtsClient {
        let settings = TtsSettings {
            engine,
            ..sekai_core::Settings::default().tts
        };
        GoogleTtsClient::new(TtsAuth::ApiKey("k".into()), settings).unwrap()
    }

    #[test]
    fn gemini_request_shape() {
        let client = client(TtsEngine::Gemini);
        let request = client.build_request(
            "こんにちは",
            Language::Japanese,
            Voice::Gemini { speaker: "Kore" },
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["input"]["text"], "こんにちは");
        assert!(value["input"]["prompt"].as_str().unwrap().contains("friendly"));
        assert_eq!(value["voice"]["languageCode"], "ja-jp");
        assert_eq!(value["voice"]["name"], "Kore");
        assert_eq!(value["voice"]["modelName"], "gemini-2.5-pro-tts");
        assert!(value["voice"].get("ssmlGender").is_none());
        assert_eq!(value["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(value["audioConfig"]["speakingRate"], 1.0);
    }

    #[test]
    fn chirp_request_shape() {
        let client = client(TtsEngine::Chirp);
        let despina = &JAPANESE_VOICES[4];
        let request = client.build_request("はい", Language::Japanese, Voice::Chirp(despina));
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["input"].get("prompt").is_none());
        assert_eq!(value["voice"]["languageCode"], "ja-JP");
        assert_eq!(value["voice"]["name"], "ja-JP-Chirp3-HD-Despina");
        assert_eq!(value["voice"]["ssmlGender"], "FEMALE");
        assert!(value["voice"].get("modelName").is_none());
        let rate = value["audioConfig"]["speakingRate"].as_f64().unwrap();
        assert!((rate - 0.9).abs() < 1e-6);
    }

    #[test]
    fn blank_style_prompt_uses_default() {
        let mut client = client(TtsEngine::Gemini);
        client.settings.style_prompt = "  ".into();
        let request = client.build_request("hi", Language::English, Voice::Gemini { speaker: "Kore" });
        assert_eq!(request.input.prompt, Some(DEFAULT_STYLE_PROMPT));
    }

    #[test]
    fn voice_choice_follows_engine() {
        let gemini = client(TtsEngine::Gemini);
        assert!(matches!(
            gemini.pick_voice(Language::English),
            Voice::Gemini { .. }
        ));

        let chirp = client(TtsEngine::Chirp);
        let voice = chirp.pick_voice(Language::English);
        assert!(matches!(voice, Voice::Chirp(v) if ENGLISH_VOICES.contains(v)));

        let mut not_gemini_model = client(TtsEngine::Gemini);
        not_gemini_model.settings.model_name = "chirp3-hd".into();
        assert!(matches!(
            not_gemini_model.pick_voice(Language::Japanese),
            Voice::Chirp(_)
        ));
    }

    #[test]
    fn decodes_audio_content() {
        let body = format!(r#"{{"audioContent":"{}"}}"#, STANDARD.encode(b"ID3fake"));
        assert_eq!(decode_audio(&body).unwrap(), b"ID3fake");
        assert!(matches!(decode_audio("{}"), Err(TtsError::InvalidFormat(_))));
        assert!(matches!(
            decode_audio(r#"{"audioContent":"***"}"#),
            Err(TtsError::Decode(_))
        ));
    }

    #[test]
    fn bearer_token_preferred() {
        let secrets = Secrets {
            google_tts_api_key: Some("key".into()),
            google_access_token: Some("ya29".into()),
            ..Default::default()
        };
        assert!(matches!(TtsAuth::from_secrets(&secrets), Some(TtsAuth::Bearer(t)) if t == "ya29"));
        assert!(TtsAuth::from_secrets(&Secrets::default()).is_none());
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() {
        let client = client(TtsEngine::Chirp);
        let err = client
            .synthesize("  ", Language::English, client.pick_voice(Language::English))
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::EmptyText));
    }
}
