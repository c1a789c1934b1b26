use std::path::{Path, PathBuf};

use carousel_contracts::models::CallingConvention;
use serde_json::Value;

use crate::client::{self, ClientCall, GenaiClient};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::request::GenerationRequest;
use crate::rest;
use crate::transport::{ensure_success, HttpTransport, ReqwestTransport};

/// A request body in the shape its model's calling convention expects.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedRequest {
    RestJson { payload: Value },
    StructuredClient(ClientCall),
}

impl PreparedRequest {
    /// Performs no I/O; fails only when the logo cannot be encoded.
    pub fn build(request: &GenerationRequest) -> Result<Self> {
        match request.model().calling_convention() {
            CallingConvention::RestJson => Ok(PreparedRequest::RestJson {
                payload: rest::build_payload(request)?,
            }),
            CallingConvention::StructuredClient => {
                Ok(PreparedRequest::StructuredClient(client::build_call(request)))
            }
        }
    }
}

pub struct ImageGenerator {
    config: GeneratorConfig,
    transport: Box<dyn HttpTransport>,
}

impl ImageGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    pub fn with_transport(config: GeneratorConfig, transport: impl HttpTransport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates one image and writes it to `output_path`, replacing any
    /// existing file. One blocking round-trip, no retry.
    pub fn generate_and_save(
        &self,
        request: &GenerationRequest,
        output_path: &Path,
    ) -> Result<PathBuf> {
        match PreparedRequest::build(request)? {
            PreparedRequest::RestJson { payload } => {
                let endpoint = self.config.endpoint_for_model(request.model());
                let response = self.transport.post_json(
                    rest::PROVIDER,
                    &endpoint,
                    self.config.api_key(),
                    &payload,
                    self.config.request_timeout(),
                )?;
                ensure_success(rest::PROVIDER, &response)?;
                rest::decode_response(&response.body, output_path)
            }
            PreparedRequest::StructuredClient(call) => {
                let response =
                    GenaiClient::new(self.transport.as_ref(), &self.config).generate_content(&call)?;
                client::decode_response(response.parts(), output_path)
            }
        }
    }
}
