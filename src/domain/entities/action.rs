use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::value_objects::{ActionId, UserId};

/// アクション種別タグ。ペイロードの各バリアントと一対一で対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateVitalReading,
    LogMedicationDose,
    CreateReminder,
    SubmitFeedback,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateVitalReading => "create_vital_reading",
            ActionKind::LogMedicationDose => "log_medication_dose",
            ActionKind::CreateReminder => "create_reminder",
            ActionKind::SubmitFeedback => "submit_feedback",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_vital_reading" => Ok(ActionKind::CreateVitalReading),
            "log_medication_dose" => Ok(ActionKind::LogMedicationDose),
            "create_reminder" => Ok(ActionKind::CreateReminder),
            "submit_feedback" => Ok(ActionKind::SubmitFeedback),
            other => Err(format!("Unknown action kind: {other}")),
        }
    }
}

/// 遅延書き込みのペイロード。タグごとに形が固定された閉じた直和型。
///
/// Adding a variant forces every consumption site (replay handlers,
/// serialization, kind mapping) through exhaustive matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    CreateVitalReading {
        kind: String,
        value: f64,
        unit: String,
        measured_at_ms: i64,
    },
    LogMedicationDose {
        medication_id: String,
        dose_date: String,
        taken_at_ms: i64,
    },
    CreateReminder {
        title: String,
        remind_at_ms: i64,
        notes: Option<String>,
    },
    SubmitFeedback {
        category: String,
        message: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::CreateVitalReading { .. } => ActionKind::CreateVitalReading,
            ActionPayload::LogMedicationDose { .. } => ActionKind::LogMedicationDose,
            ActionPayload::CreateReminder { .. } => ActionKind::CreateReminder,
            ActionPayload::SubmitFeedback { .. } => ActionKind::SubmitFeedback,
        }
    }
}

/// ストアに永続化される遅延アクション。作成後は不変。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineAction {
    pub id: ActionId,
    pub user_id: UserId,
    pub created_at_ms: i64,
    pub payload: ActionPayload,
}

impl OfflineAction {
    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

/// enqueue への入力。id とタイムスタンプはキュー側で生成される。
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDraft {
    pub user_id: UserId,
    pub payload: ActionPayload,
}

impl ActionDraft {
    pub fn new(user_id: UserId, payload: ActionPayload) -> Self {
        Self { user_id, payload }
    }
}
