//! Puzzle operations against the puzzle process
//!
//! Reads go through dry runs; writes are signed messages followed by a result
//! fetch. Correct answers are committed with [`riddle_hash`] before they leave
//! the client.

use std::fmt;
use std::str::FromStr;

use riddle_hash::{CommitError, Committer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::rpc::{protocol_tags, AoError, AoTransport, ProcessResult};
use crate::wallet::Signer;

/// Fewest questions a puzzle may have
pub const MIN_QUESTIONS: usize = 1;

/// Most questions a puzzle may have
pub const MAX_QUESTIONS: usize = 10;

/// Banner used when a puzzle is posted without one
pub const DEFAULT_BANNER: &str = "/crown.avif";

/// Separator between answers in the combined answer string
pub const ANSWER_SEPARATOR: &str = ",";

#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error("A wallet is required to {0}")]
    MissingSigner(&'static str),

    #[error("Invalid puzzle: {0}")]
    InvalidDraft(String),

    #[error("Failed to commit answers: {0}")]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Ao(#[from] AoError),

    #[error("Failed to {action}: {reason}")]
    Rejected { action: &'static str, reason: String },

    #[error("Failed to {0}: no response data")]
    MissingData(&'static str),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// How a question's content is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    #[serde(alias = "image")]
    Picture,
    Video,
    Iframe,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Picture => "picture",
            QuestionKind::Video => "video",
            QuestionKind::Iframe => "iframe",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(QuestionKind::Text),
            "picture" | "image" => Ok(QuestionKind::Picture),
            "video" => Ok(QuestionKind::Video),
            "iframe" => Ok(QuestionKind::Iframe),
            other => Err(PuzzleError::InvalidDraft(format!(
                "unknown question type {:?}",
                other
            ))),
        }
    }
}

/// A single question of a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuestionRepr")]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub content: String,
    #[serde(rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl Question {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Text,
            content: content.into(),
            media_url: None,
        }
    }

    pub fn with_media(kind: QuestionKind, content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            media_url: Some(url.into()),
        }
    }
}

// Older puzzles store questions as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionRepr {
    Plain(String),
    Full {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        content: String,
        #[serde(rename = "mediaUrl", default)]
        media_url: Option<String>,
    },
}

impl From<QuestionRepr> for Question {
    fn from(repr: QuestionRepr) -> Self {
        match repr {
            QuestionRepr::Plain(content) => Question::text(content),
            QuestionRepr::Full {
                kind,
                content,
                media_url,
            } => Question {
                kind: kind.as_deref().map(lenient_kind).unwrap_or_default(),
                content,
                media_url: media_url.filter(|u| !u.is_empty()),
            },
        }
    }
}

// Kinds this client does not know are shown as text.
fn lenient_kind(name: &str) -> QuestionKind {
    name.parse().unwrap_or_else(|_| {
        warn!(kind = name, "Unknown question type, showing as text");
        QuestionKind::Text
    })
}

/// A puzzle as listed by the process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    pub name: String,
    pub reward: Option<String>,
    pub banner_image: Option<String>,
    pub questions: Vec<Question>,
    pub is_active: bool,
}

impl Puzzle {
    /// Banner path, falling back to the default
    pub fn banner(&self) -> &str {
        self.banner_image.as_deref().unwrap_or(DEFAULT_BANNER)
    }

    fn from_entry(key: &str, value: &Value) -> Result<Self, PuzzleError> {
        let object = value.as_object().ok_or_else(|| {
            PuzzleError::InvalidResponse(format!("puzzle {} is not an object", key))
        })?;

        let id = object
            .get("id")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| key.to_string());

        let questions = match object.get("questions") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match Question::deserialize(item) {
                    Ok(question) => Some(question),
                    Err(e) => {
                        warn!(puzzle_id = %id, index = i, error = %e, "Skipping unreadable question");
                        None
                    }
                })
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!(puzzle_id = %id, questions = %other, "Questions are not a list");
                Vec::new()
            }
        };

        Ok(Self {
            name: object
                .get("name")
                .and_then(scalar_to_string)
                .unwrap_or_default(),
            reward: object.get("reward").and_then(scalar_to_string),
            banner_image: object.get("bannerImage").and_then(scalar_to_string),
            questions,
            is_active: true,
            id,
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Answers to a puzzle's questions, in question order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<String>,
    lowercase: bool,
}

impl AnswerSheet {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            lowercase: false,
        }
    }

    /// Lowercase every answer before combining
    ///
    /// The commitment itself is case-sensitive; both the puzzle author and
    /// the solver must opt in for answers to match.
    pub fn lowercased(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// All answers joined into the string that gets committed or submitted
    pub fn combined(&self) -> String {
        let joined = self.answers.join(ANSWER_SEPARATOR);
        if self.lowercase {
            joined.to_lowercase()
        } else {
            joined
        }
    }
}

/// A puzzle being authored, before it is posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDraft {
    pub name: String,
    pub questions: Vec<Question>,
    pub answers: Vec<String>,
    #[serde(default)]
    pub reward: String,
    #[serde(default)]
    pub banner_image: Option<String>,
}

impl PuzzleDraft {
    /// Check the draft before anything is committed or sent
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.name.trim().is_empty() {
            return Err(PuzzleError::InvalidDraft("name must not be empty".into()));
        }

        let count = self.questions.len();
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(PuzzleError::InvalidDraft(format!(
                "a puzzle needs {}..={} questions, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, count
            )));
        }

        if let Some(i) = self.questions.iter().position(|q| q.content.trim().is_empty()) {
            return Err(PuzzleError::InvalidDraft(format!(
                "question {} has no content",
                i + 1
            )));
        }

        if self.answers.len() != count {
            return Err(PuzzleError::InvalidDraft(format!(
                "{} questions but {} answers",
                count,
                self.answers.len()
            )));
        }

        if let Some(i) = self.answers.iter().position(|a| a.trim().is_empty()) {
            return Err(PuzzleError::InvalidDraft(format!(
                "answer {} is empty",
                i + 1
            )));
        }

        Ok(())
    }

    pub fn answer_sheet(&self) -> AnswerSheet {
        AnswerSheet::new(self.answers.iter().cloned())
    }
}

/// Outcome of a posted puzzle
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub message_id: String,
    pub hashed_answers: String,
}

/// Outcome of a solve attempt the process accepted
#[derive(Debug, Clone)]
pub struct SolveReceipt {
    pub message_id: String,
    pub response: Value,
}

/// Puzzle operations over an AO transport
pub struct PuzzleClient<T> {
    transport: T,
    process_id: String,
    committer: Committer,
}

impl<T: AoTransport> PuzzleClient<T> {
    pub fn new(transport: T, process_id: impl Into<String>) -> Self {
        Self {
            transport,
            process_id: process_id.into(),
            committer: Committer::new(),
        }
    }

    /// Use a non-default committer (salt, code units, mixing)
    pub fn with_committer(mut self, committer: Committer) -> Self {
        self.committer = committer;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    /// List all puzzles
    pub async fn get_puzzles(&self) -> Result<Vec<Puzzle>, PuzzleError> {
        let result = self
            .transport
            .dryrun(&self.process_id, protocol_tags("Get-Puzzles", &[]), "{}".into())
            .await?;

        let puzzles = parse_puzzles(&result)?;
        debug!(count = puzzles.len(), "Fetched puzzles");
        Ok(puzzles)
    }

    /// Find a single puzzle by id
    pub async fn get_puzzle(&self, id: &str) -> Result<Option<Puzzle>, PuzzleError> {
        Ok(self.get_puzzles().await?.into_iter().find(|p| p.id == id))
    }

    /// Commit the draft's answers and post it
    pub async fn post_puzzle(
        &self,
        draft: &PuzzleDraft,
        signer: Option<&dyn Signer>,
    ) -> Result<PostReceipt, PuzzleError> {
        const ACTION: &str = "post puzzle";
        let signer = signer.ok_or(PuzzleError::MissingSigner(ACTION))?;
        draft.validate()?;

        let hashed_answers = self.committer.commit(&draft.answer_sheet().combined())?;
        let payload = serde_json::json!({
            "name": draft.name,
            "questions": draft.questions,
            "hashedAnswers": hashed_answers,
            "reward": draft.reward,
            "bannerImage": draft.banner_image.as_deref().unwrap_or(DEFAULT_BANNER),
        });

        let (message_id, result) = self.send("Post-Puzzle", payload, signer).await?;
        if let Some(reason) = result.error_message() {
            return Err(PuzzleError::Rejected {
                action: ACTION,
                reason,
            });
        }

        info!(message_id = %message_id, name = %draft.name, "Posted puzzle");
        Ok(PostReceipt {
            message_id,
            hashed_answers,
        })
    }

    /// Submit answers to a puzzle
    ///
    /// The combined answers travel in plaintext; the process hashes them
    /// itself before comparing against the stored commitment.
    pub async fn solve_puzzle(
        &self,
        puzzle_id: &str,
        answers: &AnswerSheet,
        signer: Option<&dyn Signer>,
    ) -> Result<SolveReceipt, PuzzleError> {
        const ACTION: &str = "solve puzzle";
        let signer = signer.ok_or(PuzzleError::MissingSigner(ACTION))?;

        let payload = serde_json::json!({
            "puzzleId": puzzle_id,
            "answers": [answers.combined()],
        });

        let (message_id, result) = self.send("Solve-Puzzle", payload, signer).await?;
        let response = check_reply(&result, ACTION)?;

        info!(message_id = %message_id, puzzle_id, "Solved puzzle");
        Ok(SolveReceipt {
            message_id,
            response,
        })
    }

    /// Grant admin rights to an address
    pub async fn add_admin(
        &self,
        address: &str,
        signer: Option<&dyn Signer>,
    ) -> Result<String, PuzzleError> {
        const ACTION: &str = "add admin";
        let signer = signer.ok_or(PuzzleError::MissingSigner(ACTION))?;

        let payload = serde_json::json!({ "address": address });
        let (message_id, result) = self.send("Add-Admin", payload, signer).await?;
        check_reply(&result, ACTION)?;

        info!(message_id = %message_id, address, "Added admin");
        Ok(message_id)
    }

    /// List admin addresses
    pub async fn get_admins(&self) -> Result<Vec<String>, PuzzleError> {
        let result = self
            .transport
            .dryrun(&self.process_id, protocol_tags("Get-Admins", &[]), "{}".into())
            .await?;

        parse_admins(&result)
    }

    /// Whether an address is in the admin list, compared case-insensitively
    pub async fn is_admin(&self, address: &str) -> Result<bool, PuzzleError> {
        Ok(self
            .get_admins()
            .await?
            .iter()
            .any(|a| a.eq_ignore_ascii_case(address)))
    }

    async fn send(
        &self,
        action: &str,
        payload: Value,
        signer: &dyn Signer,
    ) -> Result<(String, ProcessResult), PuzzleError> {
        let data = serde_json::to_string(&payload)
            .map_err(|e| PuzzleError::InvalidResponse(e.to_string()))?;
        debug!(action, data = %data, "Sending message");

        let message_id = self
            .transport
            .message(&self.process_id, protocol_tags(action, &[]), data, signer)
            .await?;
        let result = self.transport.result(&self.process_id, &message_id).await?;
        Ok((message_id, result))
    }
}

/// Puzzles from a `Get-Puzzles` reply, ordered by id
///
/// A reply without data means there are no puzzles.
pub fn parse_puzzles(result: &ProcessResult) -> Result<Vec<Puzzle>, PuzzleError> {
    let Some(data) = result.first_data() else {
        return Ok(Vec::new());
    };

    let entries: serde_json::Map<String, Value> = match serde_json::from_str::<Value>(&data)
        .map_err(|e| PuzzleError::InvalidResponse(format!("puzzle list: {}", e)))?
    {
        Value::Object(map) => map,
        // An empty Lua table encodes as an array
        Value::Array(items) if items.is_empty() => return Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), v))
            .collect(),
        other => {
            return Err(PuzzleError::InvalidResponse(format!(
                "puzzle list is not an object: {}",
                other
            )))
        }
    };

    let mut puzzles: Vec<Puzzle> = entries
        .iter()
        .filter_map(|(key, value)| match Puzzle::from_entry(key, value) {
            Ok(puzzle) => Some(puzzle),
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping unreadable puzzle");
                None
            }
        })
        .collect();

    puzzles.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.id.cmp(&b.id),
    });
    Ok(puzzles)
}

/// Admin addresses from a `Get-Admins` reply; anything but an array is empty
pub fn parse_admins(result: &ProcessResult) -> Result<Vec<String>, PuzzleError> {
    let Some(data) = result.first_data() else {
        return Ok(Vec::new());
    };

    let value: Value = serde_json::from_str(&data)
        .map_err(|e| PuzzleError::InvalidResponse(format!("admin list: {}", e)))?;

    Ok(match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    })
}

/// Failure checks shared by solve and add-admin
fn check_reply(result: &ProcessResult, action: &'static str) -> Result<Value, PuzzleError> {
    if let Some(reason) = result.error_message() {
        return Err(PuzzleError::Rejected { action, reason });
    }

    let data = result.first_data().ok_or(PuzzleError::MissingData(action))?;
    let value: Value = serde_json::from_str(&data).unwrap_or(Value::String(data));

    if let Some(reason) = value.get("error").and_then(scalar_to_string) {
        return Err(PuzzleError::Rejected { action, reason });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::{reply_error, reply_with, Call, MockTransport};
    use crate::wallet::Wallet;

    const PROCESS: &str = "ytMAMNW_48T7rJiaGOV5F102YrUNWYYmQoVljJBXoKg";

    fn wallet() -> Wallet {
        Wallet::from_phrase(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        )
        .unwrap()
    }

    fn draft() -> PuzzleDraft {
        PuzzleDraft {
            name: "Colors".into(),
            questions: vec![
                Question::text("First color?"),
                Question::with_media(QuestionKind::Picture, "Second color?", "https://example.com/b.png"),
                Question::text("Third color?"),
            ],
            answers: vec!["red".into(), "blue".into(), "green".into()],
            reward: "100".into(),
            banner_image: None,
        }
    }

    #[test]
    fn test_question_kind_parsing() {
        assert_eq!("image".parse::<QuestionKind>().unwrap(), QuestionKind::Picture);
        assert_eq!("Video".parse::<QuestionKind>().unwrap(), QuestionKind::Video);
        assert!("audio".parse::<QuestionKind>().is_err());

        let q: Question = serde_json::from_str(r#"{"type":"image","content":"x"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::Picture);
    }

    #[test]
    fn test_question_serialization() {
        let json = serde_json::to_value(Question::text("What?")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "content": "What?"}));

        let q = Question::with_media(QuestionKind::Video, "Watch", "https://v.example/1");
        let json = serde_json::to_value(q).unwrap();
        assert_eq!(json["mediaUrl"], "https://v.example/1");
    }

    #[test]
    fn test_parse_puzzles() {
        let data = r#"{
            "10": {"id": 10, "name": "Ten", "reward": 5, "questions": [{"type": "text", "content": "Q"}]},
            "2": {"id": "2", "name": "Two", "questions": ["Plain question"]},
            "x": {"name": "Keyed"}
        }"#;
        let puzzles = parse_puzzles(&reply_with(data)).unwrap();

        let ids: Vec<&str> = puzzles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "10", "x"]);
        assert_eq!(puzzles[0].questions, vec![Question::text("Plain question")]);
        assert_eq!(puzzles[1].reward.as_deref(), Some("5"));
        assert_eq!(puzzles[2].banner(), DEFAULT_BANNER);
        assert!(puzzles.iter().all(|p| p.is_active));
    }

    #[test]
    fn test_parse_puzzles_tolerates_bad_entries() {
        let data = r#"{
            "1": {"id": 1, "name": "Good", "questions": [{"type": "text", "content": "Q"}]},
            "2": {"id": 2, "name": "Odd", "questions": [{"type": "audio", "content": "Listen"}, null, 7]},
            "3": "not a puzzle",
            "4": {"id": 4, "name": "Flat", "questions": "Q"}
        }"#;
        let puzzles = parse_puzzles(&reply_with(data)).unwrap();

        let ids: Vec<&str> = puzzles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "4"]);
        assert_eq!(puzzles[0].questions, vec![Question::text("Q")]);
        assert_eq!(puzzles[1].questions, vec![Question::text("Listen")]);
        assert!(puzzles[2].questions.is_empty());
    }

    #[test]
    fn test_parse_puzzles_without_data() {
        assert!(parse_puzzles(&ProcessResult::default()).unwrap().is_empty());
        assert!(parse_puzzles(&reply_with("[]")).unwrap().is_empty());
        assert!(matches!(
            parse_puzzles(&reply_with("not json")),
            Err(PuzzleError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_admins() {
        let admins = parse_admins(&reply_with(r#"["0xabc", "0xdef"]"#)).unwrap();
        assert_eq!(admins, ["0xabc", "0xdef"]);

        assert!(parse_admins(&reply_with(r#"{"0xabc": true}"#)).unwrap().is_empty());
        assert!(parse_admins(&ProcessResult::default()).unwrap().is_empty());
    }

    #[test]
    fn test_answer_sheet() {
        let sheet = AnswerSheet::new(["Red", "Blue"]);
        assert_eq!(sheet.combined(), "Red,Blue");
        assert_eq!(sheet.clone().lowercased().combined(), "red,blue");
        assert_eq!(sheet.len(), 2);
        assert!(AnswerSheet::default().is_empty());
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut d = draft();
        d.name = "  ".into();
        assert!(matches!(d.validate(), Err(PuzzleError::InvalidDraft(_))));

        let mut d = draft();
        d.questions.clear();
        d.answers.clear();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.questions = (0..11).map(|i| Question::text(format!("Q{}", i))).collect();
        d.answers = vec!["a".into(); 11];
        assert!(d.validate().is_err());

        let mut d = draft();
        d.answers.pop();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.answers[1] = String::new();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.questions[0].content = String::new();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_draft_from_json() {
        let d: PuzzleDraft = serde_json::from_str(
            r#"{"name": "N", "questions": [{"type": "iframe", "content": "C", "mediaUrl": "u"}], "answers": ["a"]}"#,
        )
        .unwrap();
        assert_eq!(d.questions[0].kind, QuestionKind::Iframe);
        assert_eq!(d.reward, "");
        assert!(d.validate().is_ok());
    }

    #[tokio::test]
    async fn test_get_puzzles() {
        let client = PuzzleClient::new(
            MockTransport::replying(reply_with(r#"{"1": {"id": 1, "name": "One"}}"#)),
            PROCESS,
        );

        let puzzles = client.get_puzzles().await.unwrap();
        assert_eq!(puzzles.len(), 1);
        assert_eq!(puzzles[0].name, "One");
        assert_eq!(
            client.transport().calls(),
            [Call::Dryrun {
                process: PROCESS.into(),
                action: "Get-Puzzles".into(),
                data: "{}".into(),
            }]
        );

        assert!(client.get_puzzle("1").await.unwrap().is_some());
        assert!(client.get_puzzle("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_puzzle_commits_combined_answers() {
        let client = PuzzleClient::new(MockTransport::replying(ProcessResult::default()), PROCESS);
        let wallet = wallet();

        let receipt = client.post_puzzle(&draft(), Some(&wallet)).await.unwrap();
        assert_eq!(receipt.message_id, "msg-1");
        assert_eq!(receipt.hashed_answers, "3aaa84e08116547c747a7f210516f749");

        let calls = client.transport().calls();
        let Call::Message { action, data } = &calls[0] else {
            panic!("expected a message, got {:?}", calls[0]);
        };
        assert_eq!(action, "Post-Puzzle");

        let payload: Value = serde_json::from_str(data).unwrap();
        assert_eq!(payload["name"], "Colors");
        assert_eq!(payload["hashedAnswers"], "3aaa84e08116547c747a7f210516f749");
        assert_eq!(payload["bannerImage"], DEFAULT_BANNER);
        assert_eq!(payload["questions"][1]["type"], "picture");
        assert!(payload.get("answers").is_none());

        assert_eq!(calls[1], Call::Result { id: "msg-1".into() });
    }

    #[tokio::test]
    async fn test_post_puzzle_reports_process_error() {
        let client = PuzzleClient::new(MockTransport::replying(reply_error("Unauthorized")), PROCESS);
        let wallet = wallet();

        let err = client.post_puzzle(&draft(), Some(&wallet)).await.unwrap_err();
        assert!(matches!(err, PuzzleError::Rejected { reason, .. } if reason == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_writes_require_signer() {
        let client = PuzzleClient::new(MockTransport::default(), PROCESS);

        assert!(matches!(
            client.post_puzzle(&draft(), None).await,
            Err(PuzzleError::MissingSigner(_))
        ));
        assert!(matches!(
            client.solve_puzzle("1", &AnswerSheet::new(["a"]), None).await,
            Err(PuzzleError::MissingSigner(_))
        ));
        assert!(matches!(
            client.add_admin("0xabc", None).await,
            Err(PuzzleError::MissingSigner(_))
        ));

        // Nothing reached the network
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let client = PuzzleClient::new(MockTransport::default(), PROCESS);
        let wallet = wallet();

        let mut d = draft();
        d.answers.pop();
        assert!(client.post_puzzle(&d, Some(&wallet)).await.is_err());
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_solve_puzzle_sends_plaintext() {
        let client = PuzzleClient::new(
            MockTransport::replying(reply_with(r#"{"success": true}"#)),
            PROCESS,
        );
        let wallet = wallet();

        let receipt = client
            .solve_puzzle("7", &AnswerSheet::new(["red", "blue"]), Some(&wallet))
            .await
            .unwrap();
        assert_eq!(receipt.response["success"], true);

        let calls = client.transport().calls();
        let Call::Message { action, data } = &calls[0] else {
            panic!("expected a message, got {:?}", calls[0]);
        };
        assert_eq!(action, "Solve-Puzzle");
        assert_eq!(
            serde_json::from_str::<Value>(data).unwrap(),
            serde_json::json!({"puzzleId": "7", "answers": ["red,blue"]})
        );
    }

    #[tokio::test]
    async fn test_solve_puzzle_failures() {
        let wallet = wallet();
        let sheet = AnswerSheet::new(["wrong"]);

        let client = PuzzleClient::new(MockTransport::replying(reply_error("boom")), PROCESS);
        assert!(matches!(
            client.solve_puzzle("1", &sheet, Some(&wallet)).await,
            Err(PuzzleError::Rejected { .. })
        ));

        let client = PuzzleClient::new(MockTransport::replying(ProcessResult::default()), PROCESS);
        assert!(matches!(
            client.solve_puzzle("1", &sheet, Some(&wallet)).await,
            Err(PuzzleError::MissingData(_))
        ));

        let client = PuzzleClient::new(
            MockTransport::replying(reply_with(r#"{"error": "Incorrect answers"}"#)),
            PROCESS,
        );
        let err = client.solve_puzzle("1", &sheet, Some(&wallet)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to solve puzzle: Incorrect answers");
    }

    #[tokio::test]
    async fn test_add_admin() {
        let client = PuzzleClient::new(
            MockTransport::replying(reply_with(r#"{"success": true}"#)),
            PROCESS,
        );
        let wallet = wallet();

        let id = client.add_admin("0xabc", Some(&wallet)).await.unwrap();
        assert_eq!(id, "msg-1");

        let calls = client.transport().calls();
        assert_eq!(
            calls[0],
            Call::Message {
                action: "Add-Admin".into(),
                data: r#"{"address":"0xabc"}"#.into(),
            }
        );
    }

    #[tokio::test]
    async fn test_is_admin_ignores_case() {
        let client = PuzzleClient::new(
            MockTransport::replying(reply_with(r#"["0x9858EfFD232B4033E47d90003D41EC34EcaEda94"]"#)),
            PROCESS,
        );

        assert!(client
            .is_admin("0x9858effd232b4033e47d90003d41ec34ecaeda94")
            .await
            .unwrap());
        assert!(!client.is_admin("0xabc").await.unwrap());
    }
}
