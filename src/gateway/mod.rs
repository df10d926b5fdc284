//! Client for the generative backend (sentence generation and speech
//! synthesis). The service itself is an opaque collaborator; everything
//! here is request shaping, response parsing, and the over-length filter
//! that keeps the 11-unit invariant at the boundary.
//!
//! HTTP lives behind the `network` feature, mirroring how optional
//! downloads are gated elsewhere in this codebase. Parsing and the WAV
//! wrapper are feature-independent so they stay testable offline.

pub mod prompt;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use thiserror::Error;

use crate::worksheet::{MAX_UNITS, display_units};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Synthesized audio container parameters: the TTS model returns raw
/// 24kHz mono signed 16-bit PCM.
const TTS_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("요청 횟수 제한을 초과했습니다. 잠시 후 다시 시도해주세요. (하루 무료 생성 횟수는 제한적입니다)")]
    RateLimited,
    #[error("AI 응답을 해석할 수 없습니다: {0}")]
    MalformedResponse(String),
    #[error("생성된 문장이 모두 11자를 초과하여 사용할 수 없습니다")]
    NoUsableSentences,
    #[error("TTS 모델로부터 유효하지 않거나 비어있는 오디오 데이터를 받았습니다")]
    InvalidAudio,
    #[error("API 키가 설정되지 않았습니다 (config 또는 GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("network request failed: {0}")]
    Http(String),
    #[error("this build was compiled without the network feature")]
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// The label the prompt template and the UI both use.
    pub fn as_korean(self) -> &'static str {
        match self {
            Difficulty::Easy => "쉬움",
            Difficulty::Normal => "보통",
            Difficulty::Hard => "어려움",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentenceLanguage {
    Korean,
    English,
}

#[derive(Clone, Debug)]
pub struct SentenceRequest {
    /// Elementary grade, 1 through 6.
    pub grade_level: u8,
    pub goal: String,
    pub difficulty: Difficulty,
    pub sentence_count: usize,
}

// ---------------------------------------------------------------------------
// Response payloads (generativelanguage REST shapes, consumed fields only)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

/// Extract the model's text part and parse it as a JSON array of strings
/// (the prompt asks for exactly that shape).
pub fn parse_sentence_payload(body: &str) -> Result<Vec<String>, GatewayError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.text.as_deref())
        .ok_or_else(|| GatewayError::MalformedResponse("missing text part".to_string()))?;
    serde_json::from_str::<Vec<String>>(text)
        .map_err(|e| GatewayError::MalformedResponse(format!("expected JSON string array: {e}")))
}

/// Drop candidates that break the display-unit limit. Emptying the result
/// is a reported failure, never a silent empty success.
pub fn filter_candidates(raw: Vec<String>) -> Result<Vec<String>, GatewayError> {
    let kept: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && display_units(s) <= MAX_UNITS)
        .collect();
    if kept.is_empty() {
        return Err(GatewayError::NoUsableSentences);
    }
    Ok(kept)
}

/// Extract the base64 audio payload from a TTS response.
pub fn parse_audio_payload(body: &str) -> Result<String, GatewayError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let data = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.inline_data.as_ref())
        .map(|d| d.data.clone())
        .filter(|d| !d.is_empty())
        .ok_or(GatewayError::InvalidAudio)?;
    Ok(data)
}

/// Wrap raw 24kHz mono s16le PCM into a playable WAV container.
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, GatewayError> {
    if pcm.is_empty() || pcm.len() % 2 != 0 {
        return Err(GatewayError::InvalidAudio);
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TTS_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|_| GatewayError::InvalidAudio)?;
        for chunk in pcm.chunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            writer
                .write_sample(sample)
                .map_err(|_| GatewayError::InvalidAudio)?;
        }
        writer.finalize().map_err(|_| GatewayError::InvalidAudio)?;
    }
    Ok(cursor.into_inner())
}

/// Decode a TTS response body all the way to WAV bytes.
pub fn audio_from_response(body: &str) -> Result<Vec<u8>, GatewayError> {
    let b64 = parse_audio_payload(body)?;
    let pcm = BASE64
        .decode(b64.as_bytes())
        .map_err(|_| GatewayError::InvalidAudio)?;
    pcm_to_wav(&pcm)
}

pub struct AiGateway {
    api_key: String,
    pub text_model: String,
    pub tts_model: String,
    #[cfg(feature = "network")]
    http: reqwest::blocking::Client,
}

impl AiGateway {
    /// Key resolution order: explicit config value, then GEMINI_API_KEY.
    pub fn new(
        config_key: Option<&str>,
        text_model: &str,
        tts_model: &str,
    ) -> Result<Self, GatewayError> {
        let api_key = config_key
            .map(str::to_string)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)?;
        Ok(Self {
            api_key,
            text_model: text_model.to_string(),
            tts_model: tts_model.to_string(),
            #[cfg(feature = "network")]
            http: reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .map_err(|e| GatewayError::Http(e.to_string()))?,
        })
    }

    #[cfg(feature = "network")]
    pub fn generate_sentences(
        &self,
        request: &SentenceRequest,
        language: SentenceLanguage,
    ) -> Result<Vec<String>, GatewayError> {
        let prompt = match language {
            SentenceLanguage::Korean => prompt::korean_prompt(request),
            SentenceLanguage::English => prompt::english_prompt(request),
        };
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });
        let body = self.post(&self.text_model, &payload)?;
        filter_candidates(parse_sentence_payload(&body)?)
    }

    /// Synthesize speech for `text`, returning a WAV byte buffer.
    #[cfg(feature = "network")]
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>, GatewayError> {
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": { "responseModalities": ["AUDIO"] },
        });
        let body = self.post(&self.tts_model, &payload)?;
        audio_from_response(&body)
    }

    #[cfg(feature = "network")]
    fn post(&self, model: &str, payload: &serde_json::Value) -> Result<String, GatewayError> {
        let url = format!("{API_BASE}/{model}:generateContent?key={}", self.api_key);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            return Err(GatewayError::Http(format!("HTTP {status}")));
        }
        response.text().map_err(|e| GatewayError::Http(e.to_string()))
    }

    #[cfg(not(feature = "network"))]
    pub fn generate_sentences(
        &self,
        _request: &SentenceRequest,
        _language: SentenceLanguage,
    ) -> Result<Vec<String>, GatewayError> {
        Err(GatewayError::Disabled)
    }

    #[cfg(not(feature = "network"))]
    pub fn synthesize(&self, _text: &str) -> Result<Vec<u8>, GatewayError> {
        Err(GatewayError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_response(inner: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": inner }] }
            }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_sentence_payload() {
        let body = text_response(r#"["학교에 가요","도서관"]"#);
        let sentences = parse_sentence_payload(&body).unwrap();
        assert_eq!(sentences, vec!["학교에 가요", "도서관"]);
    }

    #[test]
    fn test_parse_sentence_payload_rejects_non_array() {
        let body = text_response("그냥 문장입니다");
        assert!(matches!(
            parse_sentence_payload(&body),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_sentence_payload_rejects_empty_candidates() {
        let body = r#"{"candidates": []}"#;
        assert!(matches!(
            parse_sentence_payload(body),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_filter_drops_over_length_keeps_rest() {
        let raw = vec![
            "학교".to_string(),
            "가나다라마바사아자차카타".to_string(), // 12 units
            "  놀이터  ".to_string(),
        ];
        let kept = filter_candidates(raw).unwrap();
        assert_eq!(kept, vec!["학교", "놀이터"]);
    }

    #[test]
    fn test_filter_empty_result_is_failure() {
        let raw = vec!["가나다라마바사아자차카타".to_string()];
        assert!(matches!(
            filter_candidates(raw),
            Err(GatewayError::NoUsableSentences)
        ));
    }

    #[test]
    fn test_parse_audio_payload() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": "AAAA" } }] }
            }]
        })
        .to_string();
        assert_eq!(parse_audio_payload(&body).unwrap(), "AAAA");
    }

    #[test]
    fn test_parse_audio_payload_empty_is_invalid() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": "" } }] }
            }]
        })
        .to_string();
        assert!(matches!(
            parse_audio_payload(&body),
            Err(GatewayError::InvalidAudio)
        ));
    }

    #[test]
    fn test_pcm_to_wav_header_and_length() {
        // 4 samples of silence
        let pcm = [0u8; 8];
        let wav = pcm_to_wav(&pcm).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte canonical header + data
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn test_pcm_to_wav_rejects_empty_and_odd() {
        assert!(matches!(pcm_to_wav(&[]), Err(GatewayError::InvalidAudio)));
        assert!(matches!(
            pcm_to_wav(&[1, 2, 3]),
            Err(GatewayError::InvalidAudio)
        ));
    }

    #[test]
    fn test_difficulty_labels() {
        assert_eq!(Difficulty::Easy.as_korean(), "쉬움");
        assert_eq!(Difficulty::Normal.as_korean(), "보통");
        assert_eq!(Difficulty::Hard.as_korean(), "어려움");
        assert_eq!(Difficulty::Hard.cycle(), Difficulty::Easy);
    }
}
