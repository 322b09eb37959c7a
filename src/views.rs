// views.rs
use axum::response::Html;

use crate::models::transaction::Transaction;

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

pub fn payment_form(app_name: &str) -> Html<String> {
    let body = format!(
        "<h1>{}</h1>\n\
         <form method=\"post\" action=\"/payments/initiate\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Amount (kobo) <input type=\"number\" name=\"amount\" min=\"100\" required></label>\n\
         <button type=\"submit\">Pay</button>\n\
         </form>",
        escape(app_name)
    );
    page(app_name, &body)
}

pub fn success(transaction: &Transaction) -> Html<String> {
    let body = format!(
        "<h1>Payment successful</h1>\n\
         <dl>\n\
         <dt>Reference</dt><dd>{}</dd>\n\
         <dt>Email</dt><dd>{}</dd>\n\
         <dt>Amount</dt><dd>NGN {}</dd>\n\
         <dt>Status</dt><dd>{}</dd>\n\
         </dl>",
        escape(&transaction.reference),
        escape(&transaction.email),
        transaction.amount_major(),
        transaction.status
    );
    page("Payment successful", &body)
}

pub fn failed(error: &str, transaction: Option<&Transaction>) -> Html<String> {
    let details = match transaction {
        Some(tx) => format!(
            "\n<dl>\n<dt>Reference</dt><dd>{}</dd>\n<dt>Amount</dt><dd>NGN {}</dd>\n<dt>Status</dt><dd>{}</dd>\n</dl>",
            escape(&tx.reference),
            tx.amount_major(),
            tx.status
        ),
        None => String::new(),
    };
    let body = format!(
        "<h1>Payment failed</h1>\n<p class=\"error\">{}</p>{}\n<a href=\"/\">Try again</a>",
        escape(error),
        details
    );
    page("Payment failed", &body)
}
