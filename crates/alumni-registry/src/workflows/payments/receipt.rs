//! HTML money receipt issued when a payment is approved.

use chrono::{DateTime, FixedOffset, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;

use super::domain::Payment;

pub const RECEIPT_DIR: &str = "receipts";
const DHAKA_OFFSET_SECS: i32 = 6 * 3600;

/// `receipts/money_receipt_<20 alphanumerics>.html`
pub fn receipt_path() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect();
    format!("{RECEIPT_DIR}/money_receipt_{token}.html")
}

/// Two decimals with thousands separators: `1,234.50`.
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}.{fraction}")
}

/// Receipt date in Bangladesh time, e.g. `27 January 2026`.
pub fn receipt_date(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(DHAKA_OFFSET_SECS) {
        Some(dhaka) => at.with_timezone(&dhaka).format("%d %B %Y").to_string(),
        None => at.format("%d %B %Y").to_string(),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
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

fn info_row(label: &str, value: &str) -> String {
    format!(
        "        <div class=\"info-row\"><div class=\"info-label\">{label}:</div><div class=\"info-value\">{}</div></div>\n",
        escape(value)
    )
}

/// Renders the receipt. Unapproved payments are dated `now`.
pub fn render_receipt(payment: &Payment, now: DateTime<Utc>) -> String {
    let date = receipt_date(payment.approval.approved_at.unwrap_or(now));
    let mut rows = String::new();
    rows.push_str(&info_row("Member ID", payment.member_id.as_deref().unwrap_or("N/A")));
    rows.push_str(&info_row("Name", &payment.name));
    rows.push_str(&info_row("Address", &payment.address));
    rows.push_str(&info_row("Mobile Number", &payment.mobile_number));
    rows.push_str(&info_row("Payment Purpose", payment.payment_purpose.label()));
    rows.push_str(&info_row(
        "Payment Method",
        payment.payment_method.as_deref().unwrap_or("N/A"),
    ));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Money Receipt - Payment #{id}</title>
    <style>
        body {{ font-family: "DejaVu Sans", sans-serif; margin: 40px; color: #222; }}
        .header {{ text-align: center; border-bottom: 2px solid #222; padding-bottom: 12px; }}
        .header h1 {{ margin: 0; font-size: 22px; }}
        .header h2 {{ margin: 4px 0 0; font-size: 16px; }}
        .title {{ text-align: center; font-size: 20px; margin: 20px 0; text-decoration: underline; }}
        .receipt-no, .date-section {{ font-weight: bold; margin-bottom: 8px; }}
        .info-row {{ display: flex; margin: 6px 0; }}
        .info-label {{ width: 180px; font-weight: bold; }}
        .amount {{ margin-top: 24px; border: 1px solid #222; padding: 12px; }}
        .amount-value {{ font-size: 20px; font-weight: bold; }}
        .footer {{ margin-top: 40px; text-align: center; font-size: 12px; color: #555; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>JAHAPUR SECONDARY SCHOOL</h1>
        <h2>ALUMNI ASSOCIATION</h2>
    </div>
    <div class="title">Money Receipt</div>
    <div class="receipt-no">
        Receipt No: {receipt_no}
    </div>
    <div class="date-section">
        Date: {date}
    </div>
    <div class="info">
{rows}    </div>
    <div class="amount">
        <div class="amount-label">Amount Received</div>
        <div class="amount-value">BDT {amount}</div>
    </div>
    <div class="footer">
        This is a computer-generated receipt. No signature required.
    </div>
</body>
</html>
"#,
        id = payment.id,
        receipt_no = format!("{:06}", payment.id.0),
        amount = format_amount(payment.payment_amount),
    )
}
