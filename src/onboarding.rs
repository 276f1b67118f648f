//! First-login sequence a client walks through before reaching the dashboard:
//! urgency screening, PDPA consent, then case-code verification.
//!
//! The current step is never stored directly. It is derived from completion
//! flags in a [`FlagStore`], and flags can only be set, so a finished step
//! cannot come back.

use std::{collections::HashMap, fmt, str::FromStr};

use anyhow::bail;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;

use crate::models::onboarding_flags::OnboardingFlagData;

pub const FLAG_URGENCY: &str = "urgency_acknowledged";
pub const FLAG_PDPA: &str = "pdpa_consented";
pub const FLAG_TOKEN: &str = "token_verified";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Urgency,
    Pdpa,
    Token,
    Done,
}

impl Step {
    pub const SEQUENCE: [Step; 3] = [Step::Urgency, Step::Pdpa, Step::Token];

    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Step::Urgency => Some(FLAG_URGENCY),
            Step::Pdpa => Some(FLAG_PDPA),
            Step::Token => Some(FLAG_TOKEN),
            Step::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Urgency => "urgency",
            Step::Pdpa => "pdpa",
            Step::Token => "token",
            Step::Done => "done",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgency" => Ok(Step::Urgency),
            "pdpa" => Ok(Step::Pdpa),
            "token" => Ok(Step::Token),
            "done" => Ok(Step::Done),
            _ => bail!("Unknown onboarding step: {}", s),
        }
    }
}

/// Persistent boolean flags. Flags can only be set.
pub trait FlagStore {
    fn get(&mut self, flag: &str) -> anyhow::Result<bool>;
    fn set(&mut self, flag: &str) -> anyhow::Result<()>;
}

pub fn current_step<S: FlagStore + ?Sized>(store: &mut S) -> anyhow::Result<Step> {
    for step in Step::SEQUENCE {
        if let Some(flag) = step.flag() {
            if !store.get(flag)? {
                return Ok(step);
            }
        }
    }
    Ok(Step::Done)
}

/// Completes `step` if it is the current one and returns the next step.
/// Completing a step that is already behind the user changes nothing.
pub fn complete<S: FlagStore + ?Sized>(store: &mut S, step: Step) -> anyhow::Result<Step> {
    let current = current_step(store)?;
    if step < current {
        return Ok(current);
    }
    if step != current {
        bail!("Finish the {} step first", current);
    }
    match step.flag() {
        Some(flag) => store.set(flag)?,
        None => return Ok(Step::Done),
    }
    current_step(store)
}

/// Debug escape hatch: marks every step finished.
pub fn skip_all<S: FlagStore + ?Sized>(store: &mut S) -> anyhow::Result<Step> {
    for step in Step::SEQUENCE {
        if let Some(flag) = step.flag() {
            if !store.get(flag)? {
                store.set(flag)?;
            }
        }
    }
    current_step(store)
}

#[derive(Default)]
pub struct MemoryFlagStore {
    flags: HashMap<String, bool>,
}

impl FlagStore for MemoryFlagStore {
    fn get(&mut self, flag: &str) -> anyhow::Result<bool> {
        Ok(self.flags.get(flag).copied().unwrap_or(false))
    }

    fn set(&mut self, flag: &str) -> anyhow::Result<()> {
        self.flags.insert(flag.to_string(), true);
        Ok(())
    }
}

/// Flags of one user in the `onboarding_flags` table.
pub struct DbFlagStore<'a> {
    conn: &'a mut SqliteConnection,
    user_id: &'a str,
}

impl<'a> DbFlagStore<'a> {
    pub fn new(conn: &'a mut SqliteConnection, user_id: &'a str) -> Self {
        Self { conn, user_id }
    }
}

impl FlagStore for DbFlagStore<'_> {
    fn get(&mut self, flag: &str) -> anyhow::Result<bool> {
        use crate::schema::onboarding_flags;

        let value = onboarding_flags::table
            .filter(onboarding_flags::user_id.eq(self.user_id))
            .filter(onboarding_flags::flag.eq(flag))
            .select(onboarding_flags::value)
            .get_result::<bool>(&mut *self.conn)
            .optional()?;
        Ok(value.unwrap_or(false))
    }

    fn set(&mut self, flag: &str) -> anyhow::Result<()> {
        use crate::schema::onboarding_flags;

        let data = OnboardingFlagData {
            user_id: self.user_id.to_string(),
            flag: flag.to_string(),
            value: true,
            updated_at: Utc::now().naive_utc(),
        };
        diesel::replace_into(onboarding_flags::table)
            .values(&data)
            .execute(&mut *self.conn)?;
        Ok(())
    }
}
