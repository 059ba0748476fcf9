//! This module contains the composition of the e-mails sent to the helpers, and the
//! [`Mailer`] trait used to send them.

use std::fmt::Write as _;

use entity::{event, helper, job, shift};
use futures::future::BoxFuture;

use crate::{error::HelferResult, shift::time};

/// An e-mail ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Mail {
    /// The sender address.
    pub from: String,
    /// The recipient address.
    pub to: String,
    /// The subject line.
    pub subject: String,
    /// The plain text body.
    pub body: String,
}

/// Composes the confirmation e-mail of a registration.
///
/// The `shifts` are the shifts the helper registered for, with their job. If the helper didn't
/// register for any shift, no e-mail is composed.
pub fn confirmation_mail(
    event: &event::Model,
    helper: &helper::Model,
    shifts: &[(job::Model, shift::Model)],
) -> Option<Mail> {
    if shifts.is_empty() {
        return None;
    }

    let mut body = format!(
        "Hello {},\n\nthank you for your registration for {}. You registered for the following shifts:\n\n",
        helper.full_name(),
        event.name
    );
    for (job, shift) in shifts {
        let _ = writeln!(body, "{}: {}", job.name, time(shift));
    }

    let _ = write!(
        body,
        "\nYour data:\nName: {}\nE-Mail: {}\nMobile phone: {}\n",
        helper.full_name(),
        helper.email,
        helper.phone
    );
    if event.ask_shirt {
        let _ = writeln!(body, "T-shirt: {}", helper.shirt);
    }
    if event.ask_vegetarian {
        let _ = writeln!(body, "Vegetarian: {}", if helper.vegetarian { "yes" } else { "no" });
    }
    if let Some(instruction) = helper.infection_instruction {
        let _ = writeln!(body, "Food handling: {}", instruction.label());
    }
    if !helper.comment.is_empty() {
        let _ = writeln!(body, "Comment: {}", helper.comment);
    }

    Some(Mail {
        from: event.email.clone(),
        to: helper.email.clone(),
        subject: format!("Registration for {}", event.name),
        body,
    })
}

/// Represents the transport of the e-mails.
pub trait Mailer: Send + Sync {
    /// Sends the provided e-mail.
    fn send<'a>(&'a self, mail: &'a Mail) -> BoxFuture<'a, HelferResult<()>>;
}

/// A [`Mailer`] that only writes the e-mails to the logs.
///
/// It is used when no mail transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, mail: &'a Mail) -> BoxFuture<'a, HelferResult<()>> {
        Box::pin(async move {
            tracing::info!(
                from = %mail.from,
                to = %mail.to,
                subject = %mail.subject,
                "Sending mail:\n{}",
                mail.body
            );
            Ok(())
        })
    }
}
