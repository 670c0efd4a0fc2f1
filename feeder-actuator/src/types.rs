//! Tipos do atuador: captura HAR, comando e recibo de alimentação

use std::fmt;
use serde::{Deserialize, Serialize};
use feeder_core::traits::{now_us, Timestamp};
use crate::error::{ActuatorError, ActuatorResult};

/// Cabeçalhos que o cliente HTTP calcula sozinho
const CLIENT_MANAGED_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "accept-encoding",
    "transfer-encoding",
];

// ═══════════════════════════════════════════════════════════════════════════════
// FORMATO HAR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct HarDocument {
    log: Option<HarLog>,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: Option<HarRawRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarRawRequest {
    method: Option<String>,
    url: Option<String>,
    #[serde(default)]
    headers: Vec<HarHeader>,
    #[serde(default)]
    post_data: Option<HarPostData>,
}

/// Cabeçalho `{name, value}` de uma entrada HAR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

/// Corpo `postData` de uma entrada HAR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub text: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUISIÇÃO CAPTURADA
// ═══════════════════════════════════════════════════════════════════════════════

/// Requisição que dispara o alimentador, extraída de `log.entries[0].request`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<HarHeader>,
    pub post_data: Option<HarPostData>,
}

impl HarRequest {
    /// Lê a primeira entrada de um documento HAR
    pub fn from_har(content: &str) -> ActuatorResult<Self> {
        let document: HarDocument = serde_json::from_str(content)
            .map_err(|e| ActuatorError::InvalidHar(format!("not valid JSON: {}", e)))?;

        let log = document
            .log
            .ok_or_else(|| ActuatorError::InvalidHar("missing `log`".into()))?;
        let entry = log
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| ActuatorError::InvalidHar("`log.entries` is empty".into()))?;
        let raw = entry
            .request
            .ok_or_else(|| ActuatorError::InvalidHar("missing `log.entries[0].request`".into()))?;

        let method = raw
            .method
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ActuatorError::InvalidHar("missing `request.method`".into()))?;
        let url = raw
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ActuatorError::InvalidHar("missing `request.url`".into()))?;

        let request = Self {
            method,
            url,
            headers: raw.headers,
            post_data: raw.post_data,
        };
        request.validate()?;
        Ok(request)
    }

    /// Verifica método e URL
    pub fn validate(&self) -> ActuatorResult<()> {
        if !is_token(&self.method) {
            return Err(ActuatorError::InvalidHar(format!(
                "invalid HTTP method: {:?}",
                self.method
            )));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ActuatorError::InvalidHar(format!(
                "url must be http(s): {}",
                self.url
            )));
        }
        Ok(())
    }

    /// Cabeçalhos reenviados: sem pseudo-cabeçalhos HTTP/2 nem os do cliente.
    /// Nomes repetidos viram uma só linha, `cookie` unido por `"; "` e os
    /// demais por `", "`, na posição da primeira ocorrência.
    pub fn replay_headers(&self) -> Vec<HarHeader> {
        let mut headers: Vec<HarHeader> = Vec::with_capacity(self.headers.len());

        for header in &self.headers {
            let name = header.name.trim();
            if name.is_empty()
                || name.starts_with(':')
                || CLIENT_MANAGED_HEADERS
                    .iter()
                    .any(|managed| name.eq_ignore_ascii_case(managed))
            {
                continue;
            }

            let value = header.value.trim();
            match headers.iter_mut().find(|h| h.name.eq_ignore_ascii_case(name)) {
                Some(existing) => {
                    let separator = if name.eq_ignore_ascii_case("cookie") { "; " } else { ", " };
                    existing.value.push_str(separator);
                    existing.value.push_str(value);
                }
                None => headers.push(HarHeader {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }

        headers
    }

    /// Existe cabeçalho com esse nome?
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.name.trim().eq_ignore_ascii_case(name))
    }

    /// Método que normalmente leva corpo
    pub fn carries_body(&self) -> bool {
        matches!(self.method.as_str(), "POST" | "PUT" | "PATCH")
    }

    /// Corpo a enviar, se houver
    pub fn body(&self) -> Option<&str> {
        match &self.post_data {
            Some(data) => Some(data.text.as_str()),
            None if self.carries_body() => Some(""),
            None => None,
        }
    }

    /// `Content-Type` do `postData`, quando nenhum cabeçalho já o define
    pub fn implied_content_type(&self) -> Option<&str> {
        if self.has_header("content-type") {
            return None;
        }
        self.post_data
            .as_ref()
            .map(|d| d.mime_type.trim())
            .filter(|m| !m.is_empty())
    }
}

impl fmt::Display for HarRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// `tchar` da RFC 9110
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMANDO E RECIBO
// ═══════════════════════════════════════════════════════════════════════════════

/// Origem de um pedido de alimentação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedCommand {
    /// Disparado pelo ciclo após veredito "precisa de ração"
    Scheduled,
    /// Botão "Feed Now"
    Manual,
}

impl fmt::Display for FeedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedCommand::Scheduled => write!(f, "scheduled"),
            FeedCommand::Manual => write!(f, "manual"),
        }
    }
}

/// Resposta do servidor do alimentador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReceipt {
    pub status: u16,
    /// Corpo da resposta (truncado)
    pub body: String,
    pub command: FeedCommand,
    pub sent_at: Timestamp,
}

impl FeedReceipt {
    pub fn new(status: u16, body: String, command: FeedCommand) -> Self {
        Self {
            status,
            body,
            command,
            sent_at: now_us(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
