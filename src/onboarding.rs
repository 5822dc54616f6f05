//! Onboarding - profile form validation and simulated phone verification

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::models::{Gender, NewUser};

pub const AGE_RANGE: (u32, u32) = (13, 100);
pub const HEIGHT_RANGE: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE: (f64, f64) = (30.0, 300.0);
pub const MIN_PHONE_DIGITS: usize = 10;
pub const OTP_RESEND_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Age,
    Height,
    Weight,
    Gender,
    RestDay,
    Phone,
}

impl Field {
    /// Profile fields in form order (phone is handled by the verification step)
    pub const PROFILE: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::Age,
        Field::Height,
        Field::Weight,
        Field::Gender,
        Field::RestDay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Age => "Age",
            Field::Height => "Height (cm)",
            Field::Weight => "Weight (kg)",
            Field::Gender => "Gender",
            Field::RestDay => "Rest day",
            Field::Phone => "Phone",
        }
    }
}

/// Raw text of the onboarding form plus per-field errors
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub gender: String,
    pub rest_day: String,
    pub phone: String,
    errors: BTreeMap<Field, String>,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Age => &self.age,
            Field::Height => &self.height,
            Field::Weight => &self.weight,
            Field::Gender => &self.gender,
            Field::RestDay => &self.rest_day,
            Field::Phone => &self.phone,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Age => &mut self.age,
            Field::Height => &mut self.height,
            Field::Weight => &mut self.weight,
            Field::Gender => &mut self.gender,
            Field::RestDay => &mut self.rest_day,
            Field::Phone => &mut self.phone,
        }
    }

    /// Update one field. A field that already shows an error is re-checked.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
        if self.errors.contains_key(&field) {
            self.recheck(field);
        }
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        let mut value = self.value(field).to_string();
        value.push(c);
        self.set(field, value);
    }

    pub fn pop_char(&mut self, field: Field) {
        let mut value = self.value(field).to_string();
        value.pop();
        self.set(field, value);
    }

    fn recheck(&mut self, field: Field) {
        match check_field(self, field) {
            Some(msg) => {
                self.errors.insert(field, msg);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    /// Validate every profile field, recording errors
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for field in Field::PROFILE {
            if let Some(msg) = check_field(self, field) {
                self.errors.insert(field, msg);
            }
        }
        self.errors.is_empty()
    }

    /// Build the create-user body, or report which fields are wrong
    pub fn submit_payload(&mut self) -> Result<NewUser, BTreeMap<Field, String>> {
        if !self.validate() {
            return Err(self.errors.clone());
        }
        let phone = self.phone.trim();
        Ok(NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            age: parse_num::<u32>(&self.age).unwrap_or_default(),
            height: parse_num::<f64>(&self.height).unwrap_or_default(),
            weight: parse_num::<f64>(&self.weight).unwrap_or_default(),
            gender: Gender::parse(&self.gender).unwrap_or(Gender::Other),
            rest_day: parse_num::<u8>(&self.rest_day).unwrap_or_default(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Option<T> {
    s.trim().parse().ok()
}

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value.is_finite() && value >= lo && value <= hi
}

fn check_field(form: &ProfileForm, field: Field) -> Option<String> {
    let raw = form.value(field).trim();
    match field {
        Field::FirstName if raw.is_empty() => Some("First name is required".into()),
        Field::LastName if raw.is_empty() => Some("Last name is required".into()),
        Field::Age => match parse_num::<u32>(raw) {
            Some(age) if (AGE_RANGE.0..=AGE_RANGE.1).contains(&age) => None,
            _ => Some(format!(
                "Valid age required ({}-{})",
                AGE_RANGE.0, AGE_RANGE.1
            )),
        },
        Field::Height => match parse_num::<f64>(raw) {
            Some(h) if in_range(h, HEIGHT_RANGE) => None,
            _ => Some(format!(
                "Valid height required ({}-{} cm)",
                HEIGHT_RANGE.0, HEIGHT_RANGE.1
            )),
        },
        Field::Weight => match parse_num::<f64>(raw) {
            Some(w) if in_range(w, WEIGHT_RANGE) => None,
            _ => Some(format!(
                "Valid weight required ({}-{} kg)",
                WEIGHT_RANGE.0, WEIGHT_RANGE.1
            )),
        },
        Field::Gender if Gender::parse(raw).is_none() => {
            Some("Gender is required (male, female or other)".into())
        }
        Field::RestDay => match parse_num::<u8>(raw) {
            Some(day) if day <= 6 => None,
            _ => Some("Rest day is required (0 = Sunday .. 6 = Saturday)".into()),
        },
        Field::Phone if digit_count(raw) < MIN_PHONE_DIGITS => Some(format!(
            "Phone number needs at least {MIN_PHONE_DIGITS} digits"
        )),
        _ => None,
    }
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Form,
    Phone,
    Otp,
    Verified,
}

/// Locally simulated one-time code. Nothing is actually delivered.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    code: String,
    issued_at: Instant,
}

impl OneTimeCode {
    pub fn generate() -> Self {
        Self::issued(Instant::now())
    }

    fn issued(now: Instant) -> Self {
        let code = rand::thread_rng().gen_range(100_000..1_000_000u32);
        Self {
            code: code.to_string(),
            issued_at: now,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn matches(&self, input: &str) -> bool {
        input.trim() == self.code
    }

    pub fn resend_in(&self, now: Instant) -> Duration {
        OTP_RESEND_COOLDOWN.saturating_sub(now.saturating_duration_since(self.issued_at))
    }
}

/// Linear onboarding flow: form -> phone -> otp -> verified
#[derive(Debug, Clone)]
pub struct OnboardingFlow {
    pub form: ProfileForm,
    pub otp_input: String,
    step: Step,
    verify_phone: bool,
    sent: Option<OneTimeCode>,
    otp_error: Option<String>,
}

impl OnboardingFlow {
    pub fn new(verify_phone: bool) -> Self {
        Self {
            form: ProfileForm::new(),
            otp_input: String::new(),
            step: Step::Form,
            verify_phone,
            sent: None,
            otp_error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn sent_code(&self) -> Option<&OneTimeCode> {
        self.sent.as_ref()
    }

    pub fn otp_error(&self) -> Option<&str> {
        self.otp_error.as_deref()
    }

    /// Leave the form. Without phone verification the flow is done at once.
    pub fn submit_form(&mut self) -> bool {
        if self.step != Step::Form || !self.form.validate() {
            return false;
        }
        self.step = if self.verify_phone {
            Step::Phone
        } else {
            Step::Verified
        };
        true
    }

    /// Validate the phone number and issue a code
    pub fn send_code(&mut self) -> bool {
        if self.step != Step::Phone {
            return false;
        }
        if let Some(msg) = check_field(&self.form, Field::Phone) {
            self.form.errors.insert(Field::Phone, msg);
            return false;
        }
        self.form.errors.remove(&Field::Phone);
        self.sent = Some(OneTimeCode::generate());
        self.otp_input.clear();
        self.otp_error = None;
        self.step = Step::Otp;
        true
    }

    /// Issue a fresh code once the cooldown has passed
    pub fn resend_code(&mut self, now: Instant) -> bool {
        match &self.sent {
            Some(sent) if self.step == Step::Otp && sent.resend_in(now).is_zero() => {
                self.sent = Some(OneTimeCode::issued(now));
                self.otp_input.clear();
                self.otp_error = None;
                true
            }
            _ => false,
        }
    }

    pub fn verify(&mut self) -> bool {
        if self.step != Step::Otp {
            return false;
        }
        let ok = self
            .sent
            .as_ref()
            .is_some_and(|sent| sent.matches(&self.otp_input));
        if ok {
            self.step = Step::Verified;
            self.otp_error = None;
        } else {
            self.otp_error = Some("Invalid code, try again".to_string());
        }
        ok
    }

    pub fn back(&mut self) {
        self.step = match self.step {
            Step::Form | Step::Phone => Step::Form,
            Step::Otp => Step::Phone,
            Step::Verified if self.verify_phone => Step::Otp,
            Step::Verified => Step::Form,
        };
        self.otp_error = None;
    }

    pub fn is_verified(&self) -> bool {
        self.step == Step::Verified
    }
}
