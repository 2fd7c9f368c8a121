//! Wire codec: request/response bodies for the HTTP handshake and the
//! tagged-union vocabulary of inbound WebSocket frames.
//!
//! A `#[serde(tag = "type")]` enum with a `#[serde(other)]` catch-all
//! variant so an unrecognized `type` never blows up deserialization, and
//! `#[serde(default)]` on fields the server may omit.

use serde::{Deserialize, Serialize};

use crate::error::LiveError;

// ---------------------------------------------------------------------
// Init handshake (HTTP)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct LanguageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_switching: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PreProcessingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_enhancer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CustomVocabularyItem {
    Word(String),
    Entry(CustomVocabularyEntry),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomVocabularyEntry {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomVocabularyConfig {
    pub vocabulary: Vec<CustomVocabularyItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_intensity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomSpellingConfig {
    pub spelling_dictionary: std::collections::HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationConfig {
    pub target_languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_original_utterances: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lipsync: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_adaptation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informal: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RealtimeProcessingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_vocabulary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_vocabulary_config: Option<CustomVocabularyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_spelling: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_spelling_config: Option<CustomSpellingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_config: Option<TranslationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_entity_recognition: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SummarizationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostProcessingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization_config: Option<SummarizationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapterization: Option<bool>,
}

/// Which message categories the server pushes over the WebSocket.
///
/// The session forces `receive_acknowledgments = true` regardless of what
/// the caller asked for, since resume logic needs the acks as ground
/// truth.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_partial_transcripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_final_transcripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_speech_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_pre_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_realtime_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_post_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_acknowledgments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_lifecycle_events: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CallbackConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_partial_transcripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_final_transcripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_speech_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_pre_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_realtime_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_post_processing_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_acknowledgments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_lifecycle_events: Option<bool>,
}

/// The caller-supplied configuration forwarded to the allocator. Every
/// field but the audio format is optional; the session mutates exactly
/// one field (`messages_config.receive_acknowledgments`) before sending.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpointing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_duration_without_endpointing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_config: Option<LanguageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_processing: Option<PreProcessingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_processing: Option<RealtimeProcessingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_processing: Option<PostProcessingConfig>,
    pub messages_config: MessagesConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_config: Option<CallbackConfig>,
}

/// `{ id, created_at, url }`. `created_at` is kept as the raw ISO-8601
/// string rather than parsed, so round-tripping the response never loses
/// precision or reformats it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitResponse {
    pub id: String,
    pub created_at: String,
    pub url: String,
}

// ---------------------------------------------------------------------
// Shared payload types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
    pub channel: i32,
    #[serde(default)]
    pub speaker: Option<i32>,
    pub words: Vec<Word>,
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioChunkAckData {
    pub byte_range: [u64; 2],
    pub time_range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndRecordingMessageData {
    pub recording_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationData {
    pub utterance_id: String,
    pub utterance: Utterance,
    pub original_language: String,
    pub target_language: String,
    pub translated_utterance: Utterance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntityRecognitionResult {
    pub entity_type: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntityRecognitionData {
    pub utterance_id: String,
    pub utterance: Utterance,
    pub results: Vec<NamedEntityRecognitionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterizationSentence {
    pub sentence: String,
    pub start: f64,
    pub end: f64,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostChapterizationResult {
    #[serde(default)]
    pub abstractive_summary: Option<String>,
    #[serde(default)]
    pub extractive_summary: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub headline: String,
    pub gist: String,
    pub keywords: Vec<String>,
    pub start: f64,
    pub end: f64,
    pub sentences: Vec<ChapterizationSentence>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostChapterizationMessageData {
    pub results: Vec<PostChapterizationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionMetadata {
    pub audio_duration: f64,
    pub number_of_distinct_channels: u32,
    pub billing_time: f64,
    pub transcription_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonError {
    pub status_code: u32,
    pub exception: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentences {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub results: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub format: String,
    pub subtitles: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub full_transcript: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub sentences: Option<Vec<Sentences>>,
    #[serde(default)]
    pub subtitles: Option<Vec<Subtitle>>,
    pub utterances: Vec<Utterance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub error: Option<AddonError>,
    pub full_transcript: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub sentences: Option<Vec<Sentences>>,
    #[serde(default)]
    pub subtitles: Option<Vec<Subtitle>>,
    pub utterances: Vec<Utterance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub results: Vec<TranslationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summarization {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub results: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntityRecognition {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub entity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub results: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapterization {
    pub success: bool,
    pub is_empty: bool,
    pub exec_time: f64,
    #[serde(default)]
    pub error: Option<AddonError>,
    pub results: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub metadata: TranscriptionMetadata,
    #[serde(default)]
    pub transcription: Option<Transcription>,
    #[serde(default)]
    pub translation: Option<Translation>,
    #[serde(default)]
    pub summarization: Option<Summarization>,
    #[serde(default)]
    pub named_entity_recognition: Option<NamedEntityRecognition>,
    #[serde(default)]
    pub sentiment_analysis: Option<SentimentAnalysis>,
    #[serde(default)]
    pub chapterization: Option<Chapterization>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummarizationMessageData {
    pub results: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysisResult {
    pub sentiment: String,
    pub emotion: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub channel: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysisData {
    pub utterance_id: String,
    pub utterance: Utterance,
    pub results: Vec<SentimentAnalysisResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecordingAckData {
    pub recording_duration: f64,
    pub recording_left_to_process: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessageData {
    pub id: String,
    pub is_final: bool,
    pub utterance: Utterance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechMessageData {
    pub time: f64,
    pub channel: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

// ---------------------------------------------------------------------
// Inbound frame envelope
// ---------------------------------------------------------------------

/// Every inbound frame carries `session_id` and `created_at`; most carry
/// `data`; the two acknowledgement variants also carry `acknowledged` and
/// an optional `error` (exactly one of `data`/`error` is populated per ack
/// frame). Unknown `type` values fall through to `Unknown` rather than
/// failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessage {
    #[serde(rename = "audio_chunk")]
    AudioChunk {
        session_id: String,
        created_at: String,
        acknowledged: bool,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<AudioChunkAckData>,
    },
    #[serde(rename = "end_recording")]
    EndRecording {
        session_id: String,
        created_at: String,
        data: EndRecordingMessageData,
    },
    #[serde(rename = "end_session")]
    EndSession {
        session_id: String,
        created_at: String,
    },
    #[serde(rename = "translation")]
    Translation {
        session_id: String,
        created_at: String,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<TranslationData>,
    },
    #[serde(rename = "named_entity_recognition")]
    NamedEntityRecognition {
        session_id: String,
        created_at: String,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<NamedEntityRecognitionData>,
    },
    #[serde(rename = "post_chapterization")]
    PostChapterization {
        session_id: String,
        created_at: String,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<PostChapterizationMessageData>,
    },
    #[serde(rename = "post_final_transcript")]
    PostFinalTranscript {
        session_id: String,
        created_at: String,
        data: Box<TranscriptionResult>,
    },
    #[serde(rename = "post_summarization")]
    PostSummarization {
        session_id: String,
        created_at: String,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<PostSummarizationMessageData>,
    },
    #[serde(rename = "post_transcript")]
    PostTranscript {
        session_id: String,
        created_at: String,
        data: Transcription,
    },
    #[serde(rename = "sentiment_analysis")]
    SentimentAnalysis {
        session_id: String,
        created_at: String,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<SentimentAnalysisData>,
    },
    #[serde(rename = "start_recording")]
    StartRecording {
        session_id: String,
        created_at: String,
    },
    #[serde(rename = "start_session")]
    StartSession {
        session_id: String,
        created_at: String,
    },
    #[serde(rename = "stop_recording")]
    StopRecording {
        session_id: String,
        created_at: String,
        acknowledged: bool,
        #[serde(default)]
        error: Option<ErrorInfo>,
        #[serde(default)]
        data: Option<StopRecordingAckData>,
    },
    #[serde(rename = "transcript")]
    Transcript {
        session_id: String,
        created_at: String,
        data: TranscriptMessageData,
    },
    #[serde(rename = "speech_start")]
    SpeechStart {
        session_id: String,
        created_at: String,
        data: SpeechMessageData,
    },
    #[serde(rename = "speech_end")]
    SpeechEnd {
        session_id: String,
        created_at: String,
        data: SpeechMessageData,
    },
    #[serde(other)]
    Unknown,
}

impl WireMessage {
    pub fn session_id(&self) -> Option<&str> {
        use WireMessage::*;
        match self {
            AudioChunk { session_id, .. }
            | EndRecording { session_id, .. }
            | EndSession { session_id, .. }
            | Translation { session_id, .. }
            | NamedEntityRecognition { session_id, .. }
            | PostChapterization { session_id, .. }
            | PostFinalTranscript { session_id, .. }
            | PostSummarization { session_id, .. }
            | PostTranscript { session_id, .. }
            | SentimentAnalysis { session_id, .. }
            | StartRecording { session_id, .. }
            | StartSession { session_id, .. }
            | StopRecording { session_id, .. }
            | Transcript { session_id, .. }
            | SpeechStart { session_id, .. }
            | SpeechEnd { session_id, .. } => Some(session_id),
            Unknown => None,
        }
    }
}

/// Outbound control frame. The session only ever sends `stop_recording`;
/// audio itself is sent as raw binary frames, not through this type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "stop_recording")]
    StopRecording,
}

/// Parse one inbound text frame. Malformed JSON is reported as
/// [`LiveError::Parse`]; an unrecognized `type` deserializes successfully
/// into [`WireMessage::Unknown`] instead of failing.
pub fn parse_inbound(text: &str) -> Result<WireMessage, LiveError> {
    serde_json::from_str(text).map_err(|e| LiveError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_request_omits_unset_optionals() {
        let req = InitRequest::default();
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("encoding"));
        assert!(json.contains("\"messages_config\""));
    }

    #[test]
    fn init_response_round_trips_created_at_verbatim() {
        let json = r#"{"id":"s1","created_at":"2026-01-01T00:00:00.123456Z","url":"wss://x"}"#;
        let parsed: InitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.created_at, "2026-01-01T00:00:00.123456Z");
    }

    #[test]
    fn audio_chunk_ack_parses_success_and_failure() {
        let ok = parse_inbound(
            r#"{"type":"audio_chunk","session_id":"s","created_at":"t","acknowledged":true,"error":null,"data":{"byte_range":[0,100],"time_range":[0.0,3.1]}}"#,
        )
        .unwrap();
        match ok {
            WireMessage::AudioChunk { acknowledged, data, error, .. } => {
                assert!(acknowledged);
                assert!(error.is_none());
                assert_eq!(data.unwrap().byte_range, [0, 100]);
            }
            _ => panic!("expected AudioChunk"),
        }

        let failed = parse_inbound(
            r#"{"type":"audio_chunk","session_id":"s","created_at":"t","acknowledged":false,"error":{"message":"bad range"},"data":null}"#,
        )
        .unwrap();
        match failed {
            WireMessage::AudioChunk { acknowledged, data, error, .. } => {
                assert!(!acknowledged);
                assert!(data.is_none());
                assert_eq!(error.unwrap().message, "bad range");
            }
            _ => panic!("expected AudioChunk"),
        }
    }

    #[test]
    fn unknown_type_does_not_fail_parse() {
        let msg = parse_inbound(r#"{"type":"something_new","session_id":"s","created_at":"t"}"#)
            .unwrap();
        assert!(matches!(msg, WireMessage::Unknown));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_inbound("not json").unwrap_err();
        assert!(matches!(err, LiveError::Parse(_)));
    }

    #[test]
    fn transcript_message_round_trips() {
        let json = r#"{"type":"transcript","session_id":"s","created_at":"t","data":{"id":"u1","is_final":true,"utterance":{"start":0.0,"end":1.0,"confidence":0.9,"channel":0,"words":[],"text":"hi","language":"en"}}}"#;
        let msg = parse_inbound(json).unwrap();
        match msg {
            WireMessage::Transcript { data, .. } => {
                assert!(data.is_final);
                assert_eq!(data.utterance.text, "hi");
            }
            _ => panic!("expected Transcript"),
        }
    }

    #[test]
    fn stop_recording_client_message_serializes_tag_only() {
        let msg = ClientMessage::StopRecording;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"stop_recording"}"#);
    }

    fn sample_utterance(text: &str) -> Utterance {
        Utterance {
            start: 0.0,
            end: 1.0,
            confidence: 0.9,
            channel: 0,
            speaker: Some(1),
            words: vec![Word {
                word: text.to_string(),
                start: 0.0,
                end: 1.0,
                confidence: 0.9,
            }],
            text: text.to_string(),
            language: "en".to_string(),
        }
    }

    fn sample_transcription_result() -> TranscriptionResult {
        TranscriptionResult {
            metadata: TranscriptionMetadata {
                audio_duration: 12.0,
                number_of_distinct_channels: 1,
                billing_time: 12.0,
                transcription_time: 1.5,
            },
            transcription: Some(Transcription {
                full_transcript: "hello world".to_string(),
                languages: vec!["en".to_string()],
                sentences: None,
                subtitles: None,
                utterances: vec![sample_utterance("hello world")],
            }),
            translation: None,
            summarization: None,
            named_entity_recognition: None,
            sentiment_analysis: None,
            chapterization: None,
        }
    }

    /// Asserts `Parse(Serialize(m)) = m` for one populated `WireMessage`.
    fn assert_round_trips(message: WireMessage) {
        let json = serde_json::to_string(&message).unwrap();
        let parsed = parse_inbound(&json).unwrap();
        assert_eq!(parsed, message, "round-trip mismatch for json: {}", json);
    }

    #[test]
    fn every_populated_wire_message_variant_round_trips() {
        assert_round_trips(WireMessage::AudioChunk {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            acknowledged: true,
            error: None,
            data: Some(AudioChunkAckData {
                byte_range: [0, 100],
                time_range: [0.0, 3.1],
            }),
        });
        assert_round_trips(WireMessage::AudioChunk {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            acknowledged: false,
            error: Some(ErrorInfo { message: "bad range".to_string() }),
            data: None,
        });
        assert_round_trips(WireMessage::EndRecording {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: EndRecordingMessageData { recording_duration: 12.0 },
        });
        assert_round_trips(WireMessage::EndSession {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
        });
        assert_round_trips(WireMessage::Translation {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            error: None,
            data: Some(TranslationData {
                utterance_id: "u1".to_string(),
                utterance: sample_utterance("bonjour"),
                original_language: "fr".to_string(),
                target_language: "en".to_string(),
                translated_utterance: sample_utterance("hello"),
            }),
        });
        assert_round_trips(WireMessage::NamedEntityRecognition {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            error: None,
            data: Some(NamedEntityRecognitionData {
                utterance_id: "u1".to_string(),
                utterance: sample_utterance("Acme Corp"),
                results: vec![NamedEntityRecognitionResult {
                    entity_type: "ORG".to_string(),
                    text: "Acme Corp".to_string(),
                    start: 0.0,
                    end: 1.0,
                }],
            }),
        });
        assert_round_trips(WireMessage::PostChapterization {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            error: None,
            data: Some(PostChapterizationMessageData {
                results: vec![PostChapterizationResult {
                    abstractive_summary: Some("summary".to_string()),
                    extractive_summary: None,
                    summary: None,
                    headline: "headline".to_string(),
                    gist: "gist".to_string(),
                    keywords: vec!["keyword".to_string()],
                    start: 0.0,
                    end: 1.0,
                    sentences: vec![ChapterizationSentence {
                        sentence: "hi".to_string(),
                        start: 0.0,
                        end: 1.0,
                        words: vec![Word {
                            word: "hi".to_string(),
                            start: 0.0,
                            end: 1.0,
                            confidence: 0.9,
                        }],
                    }],
                    text: "hi".to_string(),
                }],
            }),
        });
        assert_round_trips(WireMessage::PostFinalTranscript {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: Box::new(sample_transcription_result()),
        });
        assert_round_trips(WireMessage::PostSummarization {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            error: None,
            data: Some(PostSummarizationMessageData { results: "summary text".to_string() }),
        });
        assert_round_trips(WireMessage::PostTranscript {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: Transcription {
                full_transcript: "hello world".to_string(),
                languages: vec!["en".to_string()],
                sentences: Some(vec![Sentences {
                    success: true,
                    is_empty: false,
                    exec_time: 0.1,
                    error: None,
                    results: vec!["hello world.".to_string()],
                }]),
                subtitles: Some(vec![Subtitle {
                    format: "srt".to_string(),
                    subtitles: "1\n00:00:00,000 --> 00:00:01,000\nhello world\n".to_string(),
                }]),
                utterances: vec![sample_utterance("hello world")],
            },
        });
        assert_round_trips(WireMessage::SentimentAnalysis {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            error: None,
            data: Some(SentimentAnalysisData {
                utterance_id: "u1".to_string(),
                utterance: sample_utterance("I love this"),
                results: vec![SentimentAnalysisResult {
                    sentiment: "positive".to_string(),
                    emotion: "joy".to_string(),
                    text: "I love this".to_string(),
                    start: 0.0,
                    end: 1.0,
                    channel: 0.0,
                }],
            }),
        });
        assert_round_trips(WireMessage::StartRecording {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
        });
        assert_round_trips(WireMessage::StartSession {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
        });
        assert_round_trips(WireMessage::StopRecording {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            acknowledged: true,
            error: None,
            data: Some(StopRecordingAckData {
                recording_duration: 12.0,
                recording_left_to_process: 0.0,
            }),
        });
        assert_round_trips(WireMessage::Transcript {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: TranscriptMessageData {
                id: "u1".to_string(),
                is_final: true,
                utterance: sample_utterance("hi"),
            },
        });
        assert_round_trips(WireMessage::SpeechStart {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: SpeechMessageData { time: 0.0, channel: 0.0 },
        });
        assert_round_trips(WireMessage::SpeechEnd {
            session_id: "s".to_string(),
            created_at: "t".to_string(),
            data: SpeechMessageData { time: 1.0, channel: 0.0 },
        });
    }

    #[test]
    fn custom_vocabulary_item_accepts_plain_string_or_entry() {
        let cfg = CustomVocabularyConfig {
            vocabulary: vec![
                CustomVocabularyItem::Word("hello".to_string()),
                CustomVocabularyItem::Entry(CustomVocabularyEntry {
                    value: "Gladia".to_string(),
                    intensity: Some(0.8),
                    ..Default::default()
                }),
            ],
            default_intensity: None,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"hello\""));
        assert!(json.contains("\"Gladia\""));
    }
}
