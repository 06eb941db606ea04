// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::sink::ObjectSink;
use crate::{ExportError, Result};
use chrono::NaiveDate;
use diagnostics::*;
use queryfile::{ExecuteError, QueryFile, error_chain, output, run_statements};
use serde::{Deserialize, Serialize};
use warehouse::Session;

/// Query file compiled into the binary.
pub const EXPORT_QUERY: &str = include_str!("../sql/export_query.sql");

const CONTENT_TYPE: &str = "text/csv";

/// Handler reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn done() -> Self {
        Self {
            status_code: 200,
            body: String::from("Done"),
        }
    }

    pub fn failed(body: &str) -> Self {
        Self {
            status_code: 500,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Object key of the export made on `date`.
pub fn object_key(date: NaiveDate) -> String {
    format!("{}.csv", date.format("%Y-%m-%d"))
}

pub struct ExportJob {
    query: QueryFile,
}

impl ExportJob {
    /// Fails with [`ExportError::EmptyQuery`] when `sql` has no statements.
    pub fn new(sql: &str) -> Result<Self> {
        let query = QueryFile::parse(sql);
        if query.is_empty() {
            return Err(ExportError::EmptyQuery);
        }
        Ok(Self { query })
    }

    pub fn embedded() -> Result<Self> {
        Self::new(EXPORT_QUERY)
    }

    pub fn query(&self) -> &QueryFile {
        &self.query
    }

    /// Execute the query and upload the last result under `object_key(today)`.
    pub fn run<S: Session>(&self, session: &mut S, sink: &dyn ObjectSink, today: NaiveDate) -> Response {
        let body = match self.csv(session) {
            Ok(body) => body,
            Err(err) => {
                let chain = error_chain(&err);
                error!("Error executing query from file: {chain}", chain: chain);
                return Response::failed("Error executing query");
            }
        };
        info!("Query executed successfully.");

        let key = object_key(today);
        let location = sink.location();
        if let Err(err) = sink.put(&key, &body, CONTENT_TYPE) {
            let chain = error_chain(&err);
            error!("Error uploading {key} to {location}: {chain}", key: key, location: location, chain: chain);
            return Response::failed("Error uploading export");
        }

        let bytes = body.len();
        info!("Uploaded {key} ({bytes} bytes) to {location}", key: key, bytes: bytes, location: location);
        Response::done()
    }

    fn csv<S: Session>(&self, session: &mut S) -> std::result::Result<Vec<u8>, ExecuteError> {
        let outcome = run_statements(session, &self.query, |_, _, _| Ok(()))?;
        match outcome.last {
            Some(last) => Ok(output::csv_bytes(&last)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(object_key(date), "2024-03-09.csv");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(ExportJob::new(" ;\n; "), Err(ExportError::EmptyQuery)));
    }

    #[test]
    fn test_embedded_query_parses() {
        let job = ExportJob::embedded().unwrap();
        assert_eq!(job.query().len(), 1);
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_string(&Response::failed("Error executing query")).unwrap();
        assert_eq!(json, r#"{"statusCode":500,"body":"Error executing query"}"#);
        assert!(Response::done().is_success());
    }
}
