//! Korail mobile API response DTOs.
//!
//! Every response carries a result flag and a message code. Fields are
//! plain strings on the wire (dates as `YYYYMMDD`, times as `HHMMSS`).

use serde::Deserialize;

/// Result flag for a successful call.
pub const RESULT_OK: &str = "SUCC";

/// Fields present on every response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// `SUCC` or `FAIL`.
    #[serde(rename = "strResult", default)]
    pub result: String,

    /// Provider message code, e.g. `P058`.
    #[serde(default)]
    pub h_msg_cd: String,

    /// Human-readable message (Korean).
    #[serde(default)]
    pub h_msg_txt: String,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }
}

/// Response from the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub envelope: Envelope,

    /// Membership number of the logged-in account.
    #[serde(rename = "strMbCrdNo", default)]
    pub member_no: String,

    /// Account holder's name.
    #[serde(rename = "strCustNm", default)]
    pub name: String,
}

/// Response from the schedule search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleResponse {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub trn_infos: Option<TrainInfos>,
}

impl ScheduleResponse {
    /// The listed trains, empty when the section is absent.
    pub fn trains(&self) -> &[TrainInfo] {
        self.trn_infos
            .as_ref()
            .map(|infos| infos.trn_info.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainInfos {
    #[serde(default)]
    pub trn_info: Vec<TrainInfo>,
}

/// One train in a schedule response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainInfo {
    /// Train class code: `00` KTX, `07` KTX-산천, `02` 무궁화호, ...
    pub h_trn_clsf_cd: String,
    /// Train class name, e.g. "KTX-산천".
    pub h_trn_clsf_nm: String,
    /// Train group code, echoed back when reserving.
    pub h_trn_gp_cd: String,
    pub h_trn_no: String,

    pub h_dpt_rs_stn_nm: String,
    pub h_dpt_rs_stn_cd: String,
    pub h_arv_rs_stn_nm: String,
    pub h_arv_rs_stn_cd: String,

    /// Departure date, `YYYYMMDD`.
    pub h_dpt_dt: String,
    /// Departure time, `HHMMSS`.
    pub h_dpt_tm: String,
    /// Arrival date, `YYYYMMDD`. Missing on some older responses.
    pub h_arv_dt: String,
    /// Arrival time, `HHMMSS`.
    pub h_arv_tm: String,
    /// Run date of the train (its origin departure date).
    pub h_run_dt: String,

    /// General seat availability; `11` means reservable.
    pub h_gen_rsv_cd: String,
    /// Special seat availability; `11` means reservable.
    pub h_spe_rsv_cd: String,
}

/// Response from the reservation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveResponse {
    #[serde(flatten)]
    pub envelope: Envelope,

    /// Reservation (PNR) number.
    #[serde(default)]
    pub h_pnr_no: String,
}
