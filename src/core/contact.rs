use crate::domain::model::{ContactRequest, OutgoingEmail};
use crate::domain::ports::{ListingStore, Mailer, ProfileStore};
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::validate_email;

pub const DEFAULT_SENDER: &str = "ピアノ教室・リトミック教室検索.org <info@piaryth.org>";
pub const SITE_NAME: &str = "ピアノ教室・リトミック教室検索.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    pub inquirer_message_id: String,
    pub owner_message_id: String,
}

/// 聯絡表單通知：寄自動回覆給詢問者，再通知教室負責人
pub struct ContactNotifier<'a, L: ?Sized, P: ?Sized, M: ?Sized> {
    listings: &'a L,
    profiles: &'a P,
    mailer: &'a M,
    sender: String,
}

impl<'a, L, P, M> ContactNotifier<'a, L, P, M>
where
    L: ListingStore + ?Sized,
    P: ProfileStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub fn new(listings: &'a L, profiles: &'a P, mailer: &'a M) -> Self {
        Self {
            listings,
            profiles,
            mailer,
            sender: DEFAULT_SENDER.to_string(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub async fn notify(&self, request: &ContactRequest) -> Result<ContactReceipt> {
        validate_request(request)?;

        let owner_email = self.owner_email(&request.classroom_id).await?;

        let inquirer_message_id = self
            .mailer
            .send(&self.inquirer_email(request))
            .await
            .map_err(|e| {
                tracing::error!("Failed to send inquirer email: {}", e);
                DirectoryError::MailError {
                    message: format!("failed to send inquirer email: {}", e),
                }
            })?;

        let owner_message_id = self
            .mailer
            .send(&self.owner_email_message(request, &owner_email))
            .await
            .map_err(|e| {
                tracing::error!("Failed to send owner email: {}", e);
                DirectoryError::MailError {
                    message: format!("failed to send owner email: {}", e),
                }
            })?;

        tracing::info!(
            "Contact for listing {} delivered ({} / {})",
            request.classroom_id,
            inquirer_message_id,
            owner_message_id
        );

        Ok(ContactReceipt {
            inquirer_message_id,
            owner_message_id,
        })
    }

    async fn owner_email(&self, listing_id: &str) -> Result<String> {
        let listing = self
            .listings
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| DirectoryError::not_found("listing", listing_id))?;

        let owner_id = listing
            .user_id
            .ok_or_else(|| DirectoryError::not_found("listing owner", listing_id))?;

        self.profiles
            .user_email(&owner_id)
            .await?
            .ok_or_else(|| DirectoryError::not_found("owner email", &owner_id))
    }

    fn inquirer_email(&self, request: &ContactRequest) -> OutgoingEmail {
        let mut html = format!(
            "<html><body>\
             <p>{} 様</p>\
             <p>{}へのお問い合わせを受け付けました。教室から折り返しご連絡いたします。</p>\
             <hr><p><strong>メッセージ:</strong></p><p>{}</p><hr>",
            escape_html(&request.name),
            escape_html(&request.classroom_name),
            message_html(&request.message),
        );
        if let Some(url) = &request.classroom_url {
            html.push_str(&format!(
                "<p><a href=\"{}\">{}</a></p>",
                escape_html(url),
                escape_html(&request.classroom_name)
            ));
        }
        html.push_str(&format!("<p>{}</p></body></html>", SITE_NAME));

        OutgoingEmail {
            from: self.sender.clone(),
            to: request.email.trim().to_string(),
            subject: format!(
                "【{}】お問い合わせありがとうございます（{}）",
                SITE_NAME, request.classroom_name
            ),
            html,
        }
    }

    fn owner_email_message(&self, request: &ContactRequest, owner_email: &str) -> OutgoingEmail {
        let html = format!(
            "<html><body>\
             <h2 style=\"color: #333;\">【{site}】お問い合わせがありました</h2>\
             <p><strong>{classroom}</strong>に新しいお問い合わせが届きました。</p><hr>\
             <p><strong>お名前:</strong> {name}</p>\
             <p><strong>メールアドレス:</strong> {email}</p>\
             <p><strong>メッセージ:</strong></p><p>{message}</p><hr>\
             <p>このメールは <strong>{site}</strong> のお問い合わせフォームから自動送信されました。<br>\
             直接このメールに返信せず、お問い合わせ元のメールアドレスにご連絡ください。</p>\
             </body></html>",
            site = SITE_NAME,
            classroom = escape_html(&request.classroom_name),
            name = escape_html(&request.name),
            email = escape_html(&request.email),
            message = message_html(&request.message),
        );

        OutgoingEmail {
            from: self.sender.clone(),
            to: owner_email.to_string(),
            subject: format!(
                "【{}】{} へのお問い合わせがありました（{} 様より）",
                SITE_NAME, request.classroom_name, request.name
            ),
            html,
        }
    }
}

fn validate_request(request: &ContactRequest) -> Result<()> {
    for (field, value) in [
        ("name", &request.name),
        ("message", &request.message),
        ("classroomId", &request.classroom_id),
        ("classroomName", &request.classroom_name),
    ] {
        if value.trim().is_empty() {
            return Err(DirectoryError::validation(field, format!("{} is required", field)));
        }
    }
    validate_email("email", &request.email)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn message_html(message: &str) -> String {
    escape_html(message).replace("\r\n", "\n").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use crate::domain::model::Listing;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<String> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_on == Some(sent.len()) {
                return Err(DirectoryError::MailError {
                    message: "rejected".to_string(),
                });
            }
            sent.push(email.clone());
            Ok(format!("msg-{}", sent.len()))
        }
    }

    fn directory() -> InMemoryDirectory {
        let listing: Listing = serde_json::from_value(json!({
            "id": "kobe",
            "title": "神戸ピアノサロン",
            "user_id": "owner-1"
        }))
        .unwrap();
        InMemoryDirectory::with_listings(vec![listing]).with_user_email("owner-1", "owner@example.jp")
    }

    fn request() -> ContactRequest {
        ContactRequest {
            name: "佐藤".to_string(),
            email: "sato@example.jp".to_string(),
            message: "体験レッスン<希望>\n土曜日".to_string(),
            classroom_id: "kobe".to_string(),
            classroom_name: "神戸ピアノサロン".to_string(),
            classroom_url: Some("https://piaryth.org/schools/kobe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sends_auto_reply_then_owner_notification() {
        let store = directory();
        let mailer = RecordingMailer::default();
        let receipt = ContactNotifier::new(&store, &store, &mailer)
            .notify(&request())
            .await
            .unwrap();

        assert_eq!(receipt.inquirer_message_id, "msg-1");
        assert_eq!(receipt.owner_message_id, "msg-2");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].to, "sato@example.jp");
        assert!(sent[0].subject.contains("お問い合わせありがとうございます（神戸ピアノサロン）"));
        assert_eq!(sent[1].to, "owner@example.jp");
        assert!(sent[1].subject.contains("佐藤 様より"));
        assert!(sent[1].html.contains("体験レッスン&lt;希望&gt;<br>土曜日"));
    }

    #[tokio::test]
    async fn test_owner_failure_is_reported() {
        let store = directory();
        let mailer = RecordingMailer {
            fail_on: Some(1),
            ..Default::default()
        };
        let err = ContactNotifier::new(&store, &store, &mailer)
            .notify(&request())
            .await
            .unwrap_err();

        match err {
            DirectoryError::MailError { message } => assert!(message.contains("owner")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_listing_sends_nothing() {
        let store = directory();
        let mailer = RecordingMailer::default();
        let mut unknown = request();
        unknown.classroom_id = "nagoya".to_string();

        let err = ContactNotifier::new(&store, &store, &mailer)
            .notify(&unknown)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound { .. }));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let store = directory();
        let mailer = RecordingMailer::default();
        let mut bad = request();
        bad.email = "not-an-address".to_string();

        let err = ContactNotifier::new(&store, &store, &mailer)
            .notify(&bad)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationError { .. }));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
