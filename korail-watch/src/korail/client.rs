//! Korail mobile API HTTP client.
//!
//! Holds the login session (cookies) for one account. The session is
//! replaced wholesale on re-login, never shared.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::domain::{
    ConfirmationRef, Itinerary, ReservationResult, SearchCriterion, SeatClass,
    format_clock, format_travel_date,
};
use crate::reserve::{AuthError, ReservationClient, SearchFailure};

use super::convert::{convert_trains, seat_class_code, train_type_code};
use super::error::KorailError;
use super::types::{Envelope, LoginResponse, ReserveResponse, ScheduleResponse};

/// Default base URL for the Korail mobile API.
const DEFAULT_BASE_URL: &str = "https://smart.letskorail.com:443/classes/com.korail.mobile";

const LOGIN_PATH: &str = ".login.Login";
const SEARCH_PATH: &str = ".seatMovie.ScheduleView";
const RESERVE_PATH: &str = ".certification.TicketReservation";

const DEVICE: &str = "AD";
const APP_VERSION: &str = "190617001";
const USER_AGENT: &str = "Dalvik/2.1.0 (Linux; U; Android 5.1.1; Nexus 4 Build/LMY48T)";

/// Configuration for the Korail client.
#[derive(Debug, Clone)]
pub struct KorailConfig {
    /// Base URL for the API (defaults to the production mobile API)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Adult passengers per search and reservation
    pub adults: u8,
}

impl KorailConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            adults: 1,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the number of adult passengers (at least one).
    pub fn with_adults(mut self, adults: u8) -> Self {
        self.adults = adults.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for KorailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub member_no: String,
    pub name: String,
}

/// Korail API client for one account.
#[derive(Debug)]
pub struct KorailClient {
    http: reqwest::Client,
    config: KorailConfig,
    credentials: Credentials,
    session: Option<Session>,
}

impl KorailClient {
    /// Create a client. Call [`KorailClient::login`] before searching.
    pub fn new(config: KorailConfig, credentials: Credentials) -> Result<Self, KorailError> {
        let http = build_http(&config)?;
        Ok(Self {
            http,
            config,
            credentials,
            session: None,
        })
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Log in with the stored credentials.
    pub async fn login(&mut self) -> Result<Session, AuthError> {
        let form = login_form(&self.credentials);
        let response = self
            .http
            .post(self.config.url(LOGIN_PATH))
            .form(&form)
            .send()
            .await
            .map_err(KorailError::from)?;
        let login: LoginResponse = decode(response).await?;
        check(&login.envelope)?;

        let session = Session {
            member_no: login.member_no,
            name: login.name,
        };
        info!(member = %session.member_no, "logged in");
        self.session = Some(session.clone());
        Ok(session)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, KorailError> {
        let response = self
            .http
            .get(self.config.url(path))
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    /// Search trains for a criterion's route and date.
    pub async fn fetch_trains(
        &self,
        criterion: &SearchCriterion,
    ) -> Result<Vec<Itinerary>, KorailError> {
        let schedule: ScheduleResponse = self.get(SEARCH_PATH, &self.search_query(criterion)).await?;

        if !schedule.envelope.is_ok() {
            if KorailError::is_no_results(&schedule.envelope.h_msg_cd) {
                debug!(%criterion, code = %schedule.envelope.h_msg_cd, "no trains");
                return Ok(Vec::new());
            }
            check(&schedule.envelope)?;
        }

        Ok(convert_trains(schedule.trains()))
    }

    /// Hold a seat on a train returned by [`KorailClient::fetch_trains`].
    pub async fn claim(
        &self,
        itinerary: &Itinerary,
        seat: SeatClass,
    ) -> Result<ConfirmationRef, KorailError> {
        let reserved: ReserveResponse = self
            .get(RESERVE_PATH, &self.reserve_query(itinerary, seat))
            .await?;
        confirmation(reserved)
    }

    fn search_query(&self, criterion: &SearchCriterion) -> Vec<(&'static str, String)> {
        let train_type = train_type_code(criterion.train_category).to_string();
        vec![
            ("Device", DEVICE.to_string()),
            ("Version", APP_VERSION.to_string()),
            ("radJobId", "1".to_string()),
            ("selGoTrain", train_type.clone()),
            ("txtTrnGpCd", train_type),
            ("txtGoStart", criterion.departure_station.to_string()),
            ("txtGoEnd", criterion.arrival_station.to_string()),
            ("txtGoAbrdDt", format_travel_date(criterion.date)),
            ("txtGoHour", format_clock(criterion.earliest_departure_time)),
            ("txtPsgFlg_1", self.config.adults.to_string()),
            ("txtPsgFlg_2", "0".to_string()),
            ("txtPsgFlg_3", "0".to_string()),
            ("txtPsgFlg_4", "0".to_string()),
            ("txtPsgFlg_5", "0".to_string()),
            ("txtCardPsgCnt", "0".to_string()),
            ("txtSeatAttCd_2", "000".to_string()),
            ("txtSeatAttCd_3", "000".to_string()),
            ("txtSeatAttCd_4", "015".to_string()),
            ("txtMenuId", "11".to_string()),
        ]
    }

    fn reserve_query(&self, itinerary: &Itinerary, seat: SeatClass) -> Vec<(&'static str, String)> {
        let train = &itinerary.train_ref;
        let adults = self.config.adults.to_string();
        vec![
            ("Device", DEVICE.to_string()),
            ("Version", APP_VERSION.to_string()),
            ("txtMenuId", "11".to_string()),
            ("txtJobId", "1101".to_string()),
            ("txtGdNo", String::new()),
            ("hidFreeFlg", "N".to_string()),
            ("txtTotPsgCnt", adults.clone()),
            ("txtSeatAttCd1", "000".to_string()),
            ("txtSeatAttCd2", "000".to_string()),
            ("txtSeatAttCd3", "000".to_string()),
            ("txtSeatAttCd4", "015".to_string()),
            ("txtSeatAttCd5", "000".to_string()),
            ("txtStndFlg", "N".to_string()),
            ("txtSrcarCnt", "0".to_string()),
            ("txtJrnyCnt", "1".to_string()),
            ("txtJrnySqno1", "001".to_string()),
            ("txtJrnyTpCd1", "11".to_string()),
            ("txtDptDt1", format_travel_date(itinerary.departure.date())),
            ("txtDptTm1", format_clock(itinerary.departure.time())),
            ("txtDptRsStnCd1", train.departure_station_code.clone()),
            ("txtArvRsStnCd1", train.arrival_station_code.clone()),
            ("txtTrnNo1", train.train_no.clone()),
            ("txtRunDt1", train.run_date.clone()),
            ("txtTrnClsfCd1", train.train_class_code.clone()),
            ("txtTrnGpCd1", train.train_group_code.clone()),
            ("txtPsrmClCd1", seat_class_code(seat).to_string()),
            ("txtChgFlg1", String::new()),
            ("txtPsgTpCd1", "1".to_string()),
            ("txtDiscKndCd1", "000".to_string()),
            ("txtCompaCnt1", adults),
            ("txtCardCode_1", String::new()),
            ("txtCardNo_1", String::new()),
            ("txtCardPw_1", String::new()),
        ]
    }
}

impl ReservationClient for KorailClient {
    async fn search(&self, criterion: &SearchCriterion) -> Result<Vec<Itinerary>, SearchFailure> {
        Ok(self.fetch_trains(criterion).await?)
    }

    async fn reserve(&self, itinerary: &Itinerary, seat: SeatClass) -> ReservationResult {
        match self.claim(itinerary, seat).await {
            Ok(reference) => ReservationResult::Success(reference),
            Err(err) => err.into(),
        }
    }

    async fn reauthenticate(&mut self) -> Result<(), AuthError> {
        // A fresh HTTP client drops the old cookie jar.
        self.http = build_http(&self.config).map_err(AuthError::from)?;
        self.session = None;
        self.login().await.map(|_| ())
    }
}

fn build_http(config: &KorailConfig) -> Result<reqwest::Client, KorailError> {
    Ok(reqwest::Client::builder()
        .cookie_store(true)
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// How Korail identifies the login id: e-mail, phone, or membership number.
fn input_flag(id: &str) -> &'static str {
    if id.contains('@') {
        "5"
    } else if id.starts_with("01") && id.chars().all(|c| c.is_ascii_digit() || c == '-') {
        "4"
    } else {
        "2"
    }
}

fn login_form(credentials: &Credentials) -> Vec<(&'static str, String)> {
    vec![
        ("Device", DEVICE.to_string()),
        ("Version", APP_VERSION.to_string()),
        ("txtInputFlg", input_flag(&credentials.id).to_string()),
        ("txtMemberNo", credentials.id.clone()),
        ("txtPwd", credentials.password.clone()),
    ]
}

/// The reservation number of a reserve response. A success without one
/// must not be retried: the seat may already be held.
fn confirmation(reserved: ReserveResponse) -> Result<ConfirmationRef, KorailError> {
    check(&reserved.envelope)?;
    if reserved.h_pnr_no.is_empty() {
        warn!("reservation accepted without a PNR number");
        return Err(KorailError::Unconfirmed);
    }
    Ok(ConfirmationRef::new(reserved.h_pnr_no))
}

fn check(envelope: &Envelope) -> Result<(), KorailError> {
    if envelope.is_ok() {
        Ok(())
    } else {
        Err(KorailError::from_code(&envelope.h_msg_cd, &envelope.h_msg_txt))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, KorailError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(KorailError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| KorailError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StationName, TrainCategory, TrainClass, TrainRef};
    use chrono::{NaiveDate, NaiveTime};

    fn client() -> KorailClient {
        KorailClient::new(
            KorailConfig::new().with_adults(2),
            Credentials {
                id: "1234567890".into(),
                password: "secret".into(),
            },
        )
        .unwrap()
    }

    fn lookup<'a>(query: &'a [(&'static str, String)], key: &str) -> &'a str {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn config_builder() {
        let config = KorailConfig::new()
            .with_base_url("http://localhost:9000/api")
            .with_timeout(3)
            .with_adults(0);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.adults, 1);
        assert_eq!(config.url(SEARCH_PATH), "http://localhost:9000/api.seatMovie.ScheduleView");
    }

    #[test]
    fn new_client_has_no_session() {
        assert!(client().session().is_none());
    }

    #[test]
    fn search_query_fields() {
        let criterion = SearchCriterion::new(
            StationName::parse("서울").unwrap(),
            StationName::parse("부산").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        )
        .with_train_category(TrainCategory::Any);

        let query = client().search_query(&criterion);
        assert_eq!(lookup(&query, "txtGoStart"), "서울");
        assert_eq!(lookup(&query, "txtGoEnd"), "부산");
        assert_eq!(lookup(&query, "txtGoAbrdDt"), "20260214");
        assert_eq!(lookup(&query, "txtGoHour"), "070000");
        assert_eq!(lookup(&query, "selGoTrain"), "109");
        assert_eq!(lookup(&query, "txtPsgFlg_1"), "2");
    }

    #[test]
    fn reserve_query_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        let itinerary = Itinerary {
            train_name: "KTX".into(),
            train_class: TrainClass::Express,
            departure_station: StationName::parse("서울").unwrap(),
            arrival_station: StationName::parse("부산").unwrap(),
            departure: date.and_hms_opt(8, 10, 0).unwrap(),
            arrival: date.and_hms_opt(10, 49, 0).unwrap(),
            available_seats: [SeatClass::Premium].into(),
            train_ref: TrainRef {
                train_no: "00101".into(),
                train_class_code: "00".into(),
                train_group_code: "100".into(),
                departure_station_code: "0001".into(),
                arrival_station_code: "0020".into(),
                run_date: "20260214".into(),
            },
        };

        let query = client().reserve_query(&itinerary, SeatClass::Premium);
        assert_eq!(lookup(&query, "txtTrnNo1"), "00101");
        assert_eq!(lookup(&query, "txtDptTm1"), "081000");
        assert_eq!(lookup(&query, "txtDptRsStnCd1"), "0001");
        assert_eq!(lookup(&query, "txtPsrmClCd1"), "2");
        assert_eq!(lookup(&query, "txtTotPsgCnt"), "2");
    }

    #[test]
    fn login_input_flag() {
        assert_eq!(input_flag("someone@example.com"), "5");
        assert_eq!(input_flag("010-1234-5678"), "4");
        assert_eq!(input_flag("1234567890"), "2");

        let form = login_form(&Credentials {
            id: "a@b.c".into(),
            password: "pw".into(),
        });
        assert_eq!(lookup(&form, "txtInputFlg"), "5");
        assert_eq!(lookup(&form, "txtPwd"), "pw");
    }

    #[test]
    fn envelope_check() {
        let ok = Envelope {
            result: "SUCC".into(),
            ..Envelope::default()
        };
        assert!(check(&ok).is_ok());

        let expired = Envelope {
            result: "FAIL".into(),
            h_msg_cd: "P058".into(),
            h_msg_txt: String::new(),
        };
        assert!(matches!(check(&expired), Err(KorailError::NeedLogin)));
    }

    #[test]
    fn reservation_number_required() {
        let accepted = |pnr: &str| ReserveResponse {
            envelope: Envelope {
                result: "SUCC".into(),
                ..Envelope::default()
            },
            h_pnr_no: pnr.into(),
        };

        let reference = confirmation(accepted("PNR0001")).unwrap();
        assert_eq!(reference, ConfirmationRef::new("PNR0001"));
        assert!(matches!(
            confirmation(accepted("")),
            Err(KorailError::Unconfirmed)
        ));
    }
}
