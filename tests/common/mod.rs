#![allow(dead_code)]

use phishing_detector::random_forest::RandomForestConfig;
use phishing_detector::training::{fit_detector, TrainingOptions};
use phishing_detector::vectorizer::VectorizerConfig;
use phishing_detector::{CanonicalRecord, Label, PhishingDetector};

pub const PHISHING_SAMPLE: &str =
    "Your Amazon order has a problem. Click here to verify your payment info immediately.";

pub const LEGITIMATE_SAMPLE: &str =
    "Hi team, the agenda for Thursday's project meeting is attached. Lunch is provided.";

pub const PHISHING_EMAILS: &[&str] = &[
    "Your Amazon account has been suspended. Click here to verify your payment information immediately.",
    "URGENT: problem with your order. Verify your billing info now or your account will be closed.",
    "Dear customer, we detected a problem with your payment. Click the link to verify immediately.",
    "Your PayPal account is limited. Verify your identity and payment details immediately.",
    "Amazon security alert: unusual sign-in. Click here to confirm your account and payment info.",
    "Your order could not be shipped due to a payment problem. Update your card info immediately.",
    "Final notice: verify your account within 24 hours or it will be suspended. Click here.",
    "We could not process your order. Click here to update payment information and verify.",
    "Congratulations! You won a gift card. Click here and enter your payment info to claim.",
    "Your bank account is locked. Verify your password and card details immediately.",
    "Apple ID suspended: click the link to verify your payment method immediately.",
    "Problem with your Amazon order #4411. Verify your payment info to avoid cancellation.",
    "Action required: confirm your account information immediately to restore access. Click here.",
    "Your invoice payment failed. Click here to verify your billing info and avoid suspension.",
    "Security notice: verify your login credentials immediately or your account will be closed.",
    "Urgent: your order is on hold. Click here to verify payment and shipping info.",
];

pub const LEGITIMATE_EMAILS: &[&str] = &[
    "Hi team, attached is the agenda for tomorrow's project meeting. See you at ten.",
    "Thanks for the great presentation yesterday. Let's schedule a follow-up next week.",
    "Lunch on Friday with the design team? The new cafe downstairs looks good.",
    "Please find the quarterly report attached. Comments welcome before the board meeting.",
    "Reminder: the office will be closed Monday for the holiday. Enjoy the long weekend.",
    "Can you review my pull request for the scheduling module when you have a moment?",
    "The project timeline has been updated. Milestone two moves to the end of March.",
    "Happy birthday! The team is getting cake in the kitchen at three.",
    "Meeting notes from today's standup are in the shared folder.",
    "Hi Sam, could we move our one-on-one to Wednesday afternoon?",
    "The conference room booking for the workshop is confirmed for Tuesday.",
    "Attached are the slides from the training session. Feedback is appreciated.",
    "Our team dinner is scheduled for Thursday evening at the Italian place.",
    "Weekly newsletter: new hires, project updates and the volunteering day photos.",
    "The draft proposal looks good. I added a few comments on the budget section.",
    "Agenda for the planning meeting: roadmap review, hiring, and team offsite.",
];

pub fn fixture_records() -> Vec<CanonicalRecord> {
    let phishing = PHISHING_EMAILS
        .iter()
        .map(|t| CanonicalRecord::new(*t, Label::Phishing));
    let legitimate = LEGITIMATE_EMAILS
        .iter()
        .map(|t| CanonicalRecord::new(*t, Label::Legitimate));
    phishing.chain(legitimate).collect()
}

pub fn fixture_options() -> TrainingOptions {
    TrainingOptions {
        vectorizer: VectorizerConfig::default(),
        forest: RandomForestConfig::new().with_trees(50).with_seed(42),
        holdout_ratio: 0.0,
    }
}

pub fn fixture_detector() -> PhishingDetector {
    fit_detector(&fixture_records(), &fixture_options()).expect("fixture detector")
}
