//! Config controller gRPC handlers
//!
//! Decodes wire requests into store calls and maps store errors onto gRPC
//! status codes. No retries happen here; a failed call is reported as is.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn};

use verso_common::{ConfigSubmission, VersoError, requested_version};
use verso_persistence::{ConfigPersistence, PersistenceService};

use super::grpc::config_controller_server::ConfigController;
use super::grpc::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    UpdateRequest, UpdateResponse,
};

pub const RESP_SUCCESS: &str = "Success";
pub const RESP_UPDATE: &str = "Update";
pub const RESP_DELETE: &str = "Delete";

/// gRPC front of the config repository
#[derive(Clone)]
pub struct ConfigControllerService {
    persistence: Arc<dyn PersistenceService>,
}

impl ConfigControllerService {
    pub fn new(persistence: Arc<dyn PersistenceService>) -> Self {
        Self { persistence }
    }
}

/// Map a store error onto the gRPC status a client sees.
///
/// The store already warns about the requests it rejects; only payload
/// errors, which never reach it, are warned about here.
pub fn to_status(err: VersoError) -> Status {
    match &err {
        VersoError::DuplicateKey(_) | VersoError::InvalidPayload(_) => {
            warn!(error = %err, code = err.code().code, "Malformed config payload");
        }
        e if e.is_client_error() => {
            debug!(error = %err, code = err.code().code, "Request rejected");
        }
        _ => {
            error!(error = %err, code = err.code().code, "Config store failure");
        }
    }

    let message = err.to_string();
    match err {
        VersoError::AlreadyExists(_) => Status::already_exists(message),
        VersoError::NotFound(_) | VersoError::VersionNotFound(_, _) => Status::not_found(message),
        VersoError::NoChange(_) => Status::failed_precondition(message),
        VersoError::DuplicateKey(_) | VersoError::InvalidPayload(_) => {
            Status::invalid_argument(message)
        }
        VersoError::CorruptPayload(_) => Status::data_loss(message),
        VersoError::StoreUnavailable(_) => Status::unavailable(message),
    }
}

#[tonic::async_trait]
impl ConfigController for ConfigControllerService {
    async fn create(
        &self,
        request: Request<CreateRequest>,
    ) -> Result<Response<CreateResponse>, Status> {
        let req = request.into_inner();
        let submission = ConfigSubmission::from_json(req.conf_data.as_bytes()).map_err(to_status)?;
        info!(service = %submission.service, "Create config");

        let created = self
            .persistence
            .config_create(&submission.service, &submission.data)
            .await
            .map_err(to_status)?;

        Ok(Response::new(CreateResponse {
            resp: RESP_SUCCESS.to_string(),
            version: created.version,
        }))
    }

    async fn read(&self, request: Request<ReadRequest>) -> Result<Response<ReadResponse>, Status> {
        let req = request.into_inner();
        info!(service = %req.service_name, version = req.version, "Read config");

        let config = self
            .persistence
            .config_read(&req.service_name, requested_version(req.version))
            .await
            .map_err(to_status)?;
        let payload = config.data.encode().map_err(to_status)?;
        let conf_data = String::from_utf8(payload).map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(ReadResponse {
            resp: RESP_SUCCESS.to_string(),
            conf_data,
            version: config.version,
        }))
    }

    async fn update(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<UpdateResponse>, Status> {
        let req = request.into_inner();
        let submission = ConfigSubmission::from_json(req.conf_data.as_bytes()).map_err(to_status)?;
        info!(service = %submission.service, "Update config");

        let updated = self
            .persistence
            .config_update(&submission.service, &submission.data)
            .await
            .map_err(to_status)?;

        Ok(Response::new(UpdateResponse {
            resp: RESP_UPDATE.to_string(),
            version: updated.version,
        }))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let req = request.into_inner();
        info!(service = %req.service_name, version = req.version, "Delete config");

        self.persistence
            .config_delete(&req.service_name, requested_version(req.version))
            .await
            .map_err(to_status)?;

        Ok(Response::new(DeleteResponse {
            resp: RESP_DELETE.to_string(),
        }))
    }
}
