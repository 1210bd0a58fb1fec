use chrono::{DateTime, Utc};

use crate::{
    entities::{
        contact::ContactSubmission,
        email::{MailRouting, OutboundEmail},
        reservation::{PersonType, ReservationSubmission},
    },
    utils::html::{escape, escape_multiline},
};

const BRAND: &str = "BY THE WAVE";
const TAGLINE: &str = "Executive Mobility";
const SITE: &str = "bythewave.sk";
const ACCENT: &str = "#B88746";
const RULE: &str = "═══════════════════════════════════════";
const SAME_AS_ORDERER: &str = "Zhodný s objednávateľom";

fn yes_no(flag: bool) -> &'static str {
    if flag { "Áno" } else { "Nie" }
}

fn local_time(now: DateTime<Utc>) -> String {
    now.format("%d.%m.%Y %H:%M UTC").to_string()
}

/// One label/value row; `value` must already be escaped.
fn row(label: &str, value: &str) -> String {
    format!(
        r#"<tr><td style="padding: 10px 0; font-weight: 600; color: #555; width: 160px; vertical-align: top;">{label}:</td><td style="padding: 10px 0; color: #333; font-size: 16px;">{value}</td></tr>"#
    )
}

fn block(title: &str, escaped_body: &str) -> String {
    format!(
        r#"<h3 style="color: #333; margin: 0 0 10px 0; font-size: 16px; font-weight: 600;">{title}:</h3><div style="background: #f8f9fa; padding: 18px; border-radius: 8px; border-left: 5px solid {ACCENT}; line-height: 1.6; font-size: 16px; color: #444; margin-bottom: 18px;">{escaped_body}</div>"#
    )
}

fn layout(heading: &str, rows: &[String], blocks: &[String], reply_to: &str, reply_subject: &str, origin: &str, now: DateTime<Utc>) -> String {
    let reply = escape(reply_to);
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f5f5f5;">
  <div style="background: linear-gradient(135deg, {ACCENT} 0%, #A67C52 100%); padding: 30px 20px; border-radius: 12px 12px 0 0; text-align: center;">
    <h1 style="color: white; margin: 0; font-size: 28px; font-weight: bold;">{BRAND}</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 8px 0 0 0; font-size: 16px; letter-spacing: 1px;">{TAGLINE}</p>
  </div>
  <div style="background: white; padding: 40px 30px; border-radius: 0 0 12px 12px;">
    <h2 style="color: #333; margin: 0 0 25px 0; font-size: 24px;">{heading}</h2>
    <div style="background: #f8f9fa; padding: 25px; border-radius: 8px; margin: 25px 0; border-left: 5px solid {ACCENT};">
      <table style="width: 100%; border-collapse: collapse;">{rows}</table>
    </div>
    <div style="margin: 30px 0;">{blocks}</div>
    <div style="text-align: center; margin: 35px 0;">
      <a href="mailto:{reply}?subject=Re: {reply_subject}" style="background: {ACCENT}; color: white; padding: 12px 30px; text-decoration: none; border-radius: 6px; font-weight: 600; display: inline-block;">Odpovedať na email</a>
    </div>
    <div style="text-align: center; margin-top: 40px; padding-top: 25px; border-top: 2px solid #eee;">
      <p style="color: #666; font-size: 14px; margin: 0;">Táto správa bola odoslaná z {origin} na<br><strong style="color: {ACCENT};">{SITE}</strong> - {TAGLINE}</p>
      <p style="color: #999; font-size: 12px; margin: 10px 0 0 0;">{timestamp}</p>
    </div>
  </div>
</div>"#,
        rows = rows.concat(),
        blocks = blocks.concat(),
        timestamp = now.to_rfc3339(),
    )
}

pub fn contact_email(submission: &ContactSubmission, routing: &MailRouting, now: DateTime<Utc>) -> OutboundEmail {
    let name = submission.full_name();
    let subject = match &submission.subject {
        Some(topic) => format!("Kontakt - {} ({})", name, topic),
        None => format!("Kontakt - {}", name),
    };

    let mut rows = vec![
        row("Meno", &escape(&name)),
        row(
            "Email",
            &format!(
                r#"<a href="mailto:{0}" style="color: {ACCENT}; text-decoration: none;">{0}</a>"#,
                escape(&submission.email)
            ),
        ),
    ];
    if let Some(phone) = &submission.phone {
        rows.push(row("Telefón", &escape(phone)));
    }
    rows.push(row("Čas odoslania", &local_time(now)));

    let mut blocks = Vec::new();
    if let Some(topic) = &submission.subject {
        blocks.push(block("Predmet", &escape_multiline(topic)));
    }
    blocks.push(block("Správa", &escape_multiline(&submission.message)));

    let html = layout(
        "Nová správa z kontaktného formulára",
        &rows,
        &blocks,
        &submission.email,
        "Vaša správa pre BY THE WAVE",
        "kontaktného formulára",
        now,
    );

    let mut text = format!(
        "{BRAND} - {TAGLINE}\nNová správa z kontaktného formulára\n\n{RULE}\n\nKontaktné údaje:\n• Meno: {}\n• Email: {}\n",
        name, submission.email
    );
    if let Some(phone) = &submission.phone {
        text.push_str(&format!("• Telefón: {}\n", phone));
    }
    text.push_str(&format!("• Čas: {}\n\n", local_time(now)));
    if let Some(topic) = &submission.subject {
        text.push_str(&format!("Predmet: {}\n\n", topic));
    }
    text.push_str(&format!(
        "Správa:\n{}\n\n{RULE}\n\nPre odpoveď napíšte na: {}\n\nTáto správa bola odoslaná z kontaktného formulára na {SITE}\n",
        submission.message, submission.email
    ));

    OutboundEmail {
        from: routing.from.clone(),
        to: vec![routing.to.clone()],
        subject,
        html,
        text,
    }
}

pub fn reservation_email(submission: &ReservationSubmission, routing: &MailRouting, now: DateTime<Utc>) -> OutboundEmail {
    let name = submission.full_name();
    let subject = format!(
        "Nová web rezervácia - {} ({} {})",
        name, submission.date, submission.time
    );
    let main_passenger = submission
        .main_passenger()
        .unwrap_or_else(|| SAME_AS_ORDERER.to_string());
    let passengers = submission
        .passenger_count()
        .map(|n| n.to_string())
        .unwrap_or_else(|| submission.passengers.clone());

    let mut fields: Vec<(&str, String)> = vec![
        ("Typ", submission.person_type.label().to_string()),
        ("Meno", name.clone()),
    ];
    if submission.person_type == PersonType::Company {
        fields.push(("Firma", submission.company_name.clone().unwrap_or_default()));
    }
    fields.extend([
        ("Email", submission.email.clone()),
        ("Telefón", submission.phone.clone()),
        ("Vyzdvihnutie", submission.pickup_address.clone()),
        ("Cieľ", submission.destination_address.clone()),
        ("Dátum a čas", format!("{} {}", submission.date, submission.time)),
        ("Pasažieri", passengers),
        ("Spiatočná cesta", yes_no(submission.return_trip).to_string()),
        ("Kategória vozidla", submission.vehicle_category.clone()),
        ("Hlavný pasažier", main_passenger),
    ]);
    if let Some(flight) = &submission.flight_number {
        fields.push(("Číslo letu", flight.clone()));
    }
    fields.extend([
        ("Spôsob platby", submission.payment_method.clone()),
        ("Marketingový súhlas", yes_no(submission.marketing_consent).to_string()),
    ]);

    let mut rows: Vec<String> = fields
        .iter()
        .map(|(label, value)| row(label, &escape(value)))
        .collect();
    rows.push(row("Čas odoslania", &local_time(now)));

    let blocks: Vec<String> = submission
        .notes
        .iter()
        .map(|notes| block("Poznámky", &escape_multiline(notes)))
        .collect();

    let html = layout(
        "Nová rezervácia",
        &rows,
        &blocks,
        &submission.email,
        "Vaša rezervácia pre BY THE WAVE",
        "rezervačného formulára",
        now,
    );

    let mut text = format!("{BRAND} - {TAGLINE}\nNová rezervácia\n\n{RULE}\n\n");
    for (label, value) in &fields {
        text.push_str(&format!("{}: {}\n", label, value));
    }
    if let Some(notes) = &submission.notes {
        text.push_str(&format!("Poznámky: {}\n", notes));
    }
    text.push_str(&format!(
        "\n{RULE}\n\nPre odpoveď napíšte na: {}\n\nTáto správa bola odoslaná z rezervačného formulára na {SITE}\n",
        submission.email
    ));

    OutboundEmail {
        from: routing.from.clone(),
        to: vec![routing.to.clone()],
        subject,
        html,
        text,
    }
}
