//! Scripted assistant replies used by the conversation flow

use crate::chat::details::IdentityDetails;
use crate::chat::doctors::Doctor;
use crate::error::ShipsmartError;

pub const WELCOME: &str =
    "Hello! I'm SHIPSmart, your UC SHIP assistant. How can I help you today?";

pub const GREETING: &str =
    "Hi there! I can help you understand your UC SHIP benefits or book an appointment. What would you like to do?";

pub const DOCTOR_SELECTION: &str =
    "I can help you book an appointment. Please choose one of the available doctors below.";

pub const INSURANCE_SUMMARY: &str = "\
Here's a summary of your UC SHIP benefits (Anthem PPO Plan, 2024-25):
- Primary care and urgent care visits at Student Health & Wellness Center
- Specialist care through the Anthem PPO network
- Prescriptions, dental, and vision coverage
- Counseling and psychological services
- 24/7 Anthem Nurseline: 1-877-351-3457
For questions, UC SHIP Member Services is at 1-866-940-8306.
Would you like more details about any of these benefits?";

pub const INSURANCE_FOLLOW_UP: &str =
    "Which part of your coverage would you like me to explain in more detail: medical, pharmacy, dental, vision, or mental health?";

pub const IDENTITY_REQUEST: &str =
    "To look up your plan, please provide your student ID, date of birth, and medical ID.";

pub const IDENTITY_CONFIRMED: &str =
    "Thank you, your details are confirmed. How can I help you with your plan today?";

pub const GENERIC_ACKNOWLEDGMENT: &str =
    "Thanks for your message. I can answer questions about your UC SHIP coverage or help you book an appointment.";

pub const CLOSING_COURTESY: &str =
    "No problem. Let me know if there's anything else I can help you with.";

pub const GENERIC_FAILURE: &str =
    "I apologize, but I'm having trouble responding right now. Please try again.";

/// Ask for the identity fields that are still missing
///
/// `acknowledge` thanks the user for fields they just provided.
pub fn identity_missing(missing: &[&str], acknowledge: bool) -> String {
    format!(
        "{}I still need the following to look up your plan: {}.",
        if acknowledge { "Thanks! " } else { "" },
        missing.join(", ")
    )
}

/// Echo collected identity fields back for confirmation
pub fn identity_confirmation(details: &IdentityDetails) -> String {
    format!(
        "Please confirm your details:\n- Student ID: {}\n- Date of birth: {}\n- Medical ID: {}\nIs this correct?",
        details.student_id.as_deref().unwrap_or("-"),
        details
            .date_of_birth
            .map(|date| date.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        details.medical_id.as_deref().unwrap_or("-"),
    )
}

/// Ask the user to confirm a booking with the chosen doctor
pub fn booking_request(doctor: &Doctor) -> String {
    format!(
        "Would you like to book an appointment with {} ({})?",
        doctor.name, doctor.specialty
    )
}

/// Confirm a completed booking
pub fn booking_confirmed(doctor: &Doctor) -> String {
    format!(
        "Your appointment with {} is confirmed. You'll receive a reminder before your visit.",
        doctor.name
    )
}

/// Apology shown in place of a failed remote reply
pub fn remote_failure(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ShipsmartError>() {
        Some(ShipsmartError::RemoteServerError(code)) => format!(
            "Server error (status code: {}). Please try again later.",
            code
        ),
        Some(ShipsmartError::RemoteDecoding(_)) | Some(ShipsmartError::MalformedResponse(_)) => {
            "Invalid response from the server. Please try again.".to_string()
        }
        Some(ShipsmartError::RemoteRateLimited) => {
            "I'm receiving a lot of questions right now. Please try again in a moment.".to_string()
        }
        _ => GENERIC_FAILURE.to_string(),
    }
}
