// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between in-process items and their wire records
//!
//! A [`Codec`] pairs an item type with a plain serializable record and names
//! the durable channel the records travel on. The publisher and processor
//! are generic over it, so signals and jobs share one delivery path.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sj_core::{ActionId, Job, Parameters, Signal, SignalTypeId, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}

pub trait Codec: Send + Sync + 'static {
    type Item: Send + 'static;
    type Data: Serialize + DeserializeOwned;

    /// Durable channel records of this kind are published on
    const CHANNEL: &'static str;

    fn encode(item: &Self::Item) -> Self::Data;
    fn decode(data: Self::Data) -> Result<Self::Item, CodecError>;

    /// Encode straight to a channel payload
    fn to_payload(item: &Self::Item) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(Self::encode(item))?)
    }

    /// Decode a channel payload
    fn from_payload(payload: serde_json::Value) -> Result<Self::Item, CodecError> {
        Self::decode(serde_json::from_value(payload)?)
    }
}

/// Wire form of a [`Signal`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalData {
    pub sensor: SignalTypeId,
    #[serde(default)]
    pub parameters: Parameters,
}

pub struct SignalCodec;

impl Codec for SignalCodec {
    type Item = Signal;
    type Data = SignalData;

    const CHANNEL: &'static str = "signals";

    fn encode(signal: &Signal) -> SignalData {
        SignalData {
            sensor: signal.sensor().clone(),
            parameters: signal.parameters().clone(),
        }
    }

    fn decode(data: SignalData) -> Result<Signal, CodecError> {
        Ok(Signal::new(data.sensor, data.parameters)?)
    }
}

/// Wire form of a [`Job`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub action: ActionId,
    #[serde(default)]
    pub parameters: Parameters,
}

pub struct JobCodec;

impl Codec for JobCodec {
    type Item = Job;
    type Data = JobData;

    const CHANNEL: &'static str = "jobs";

    fn encode(job: &Job) -> JobData {
        JobData {
            action: job.action().clone(),
            parameters: job.parameters().clone(),
        }
    }

    fn decode(data: JobData) -> Result<Job, CodecError> {
        Ok(Job::new(data.action, data.parameters))
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
