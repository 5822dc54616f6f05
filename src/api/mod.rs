//! API module - typed HTTP client for the training backend

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CalendarDay, NewUser, ProgramStarted, ProgressPoint, User, Workout, WorkoutSession,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Progress for every logged exercise, keyed by exercise name
pub type AllProgress = BTreeMap<String, Vec<ProgressPoint>>;

/// The single-exercise endpoint answers either with a bare list or wrapped in `data`
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesBody {
    Bare(Vec<ProgressPoint>),
    Wrapped { data: Vec<ProgressPoint> },
}

impl SeriesBody {
    fn into_points(self) -> Vec<ProgressPoint> {
        match self {
            SeriesBody::Bare(points) => points,
            SeriesBody::Wrapped { data } => data,
        }
    }
}

/// Backend client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    /// `base_url` is the server root; requests go to `{base_url}/api/...`
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: format!("{}/api", base_url.trim_end_matches('/')),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn user_url(&self, user_id: &str, rest: &str) -> String {
        self.url(&format!("/users/{}{}", urlencoding::encode(user_id), rest))
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        debug!(%url, "GET");
        let resp = self.http.get(&url).send().await?;
        decode(resp).await
    }

    pub async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        let url = self.url("/users");
        debug!(%url, "POST");
        let resp = self.http.post(&url).json(user).send().await?;
        decode(resp).await
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.get(self.user_url(user_id, "")).await
    }

    pub async fn start_program(&self, user_id: &str) -> ApiResult<ProgramStarted> {
        let url = self.user_url(user_id, "/start-program");
        debug!(%url, "POST");
        let resp = self.http.post(&url).send().await?;
        decode(resp).await
    }

    pub async fn calendar(&self, user_id: &str, days: u32) -> ApiResult<Vec<CalendarDay>> {
        self.get(self.user_url(user_id, &format!("/calendar?days={days}")))
            .await
    }

    pub async fn current_workout(&self, user_id: &str) -> ApiResult<Workout> {
        self.get(self.user_url(user_id, "/current-workout")).await
    }

    pub async fn workout_for_date(&self, user_id: &str, date: NaiveDate) -> ApiResult<Workout> {
        self.get(self.user_url(user_id, &format!("/workout/{}", date.format("%Y-%m-%d"))))
            .await
    }

    pub async fn upcoming_workouts(&self, user_id: &str, days: u32) -> ApiResult<Vec<Workout>> {
        self.get(self.user_url(user_id, &format!("/upcoming-workouts?days={days}")))
            .await
    }

    pub async fn submit_session(&self, session: &WorkoutSession) -> ApiResult<()> {
        let url = self.user_url(&session.user_id, "/workout-session");
        debug!(%url, exercises = session.exercises.len(), "POST");
        let resp = self.http.post(&url).json(session).send().await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn exercise_progress(
        &self,
        user_id: &str,
        exercise: &str,
    ) -> ApiResult<Vec<ProgressPoint>> {
        let body: SeriesBody = self
            .get(self.user_url(
                user_id,
                &format!("/progress/{}", urlencoding::encode(exercise)),
            ))
            .await?;
        Ok(body.into_points())
    }

    pub async fn all_progress(&self, user_id: &str) -> ApiResult<AllProgress> {
        self.get(self.user_url(user_id, "/all-progress")).await
    }
}

async fn check(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let resp = check(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Throwaway HTTP server on a local port for client tests
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request
    pub(crate) async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let (base, handle) = serve(vec![(status, body)]).await;
        let handle = tokio::spawn(async move {
            handle.await.unwrap().into_iter().next().unwrap_or_default()
        });
        (base, handle)
    }

    /// Answer one connection per canned response, in order, and hand back the raw requests
    pub(crate) async fn serve(
        responses: Vec<(&'static str, &'static str)>,
    ) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                    if n == 0 || request_complete(&buf) {
                        break;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
                requests.push(String::from_utf8_lossy(&buf).to_string());
            }
            requests
        });
        (format!("http://{addr}"), handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..head_end]
            .lines()
            .find_map(|l| {
                let lower = l.to_ascii_lowercase();
                lower
                    .strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap_or(0))
            })
            .unwrap_or(0);
        buf.len() >= head_end + 4 + length
    }
}
