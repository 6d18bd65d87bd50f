//! Claim Letter Rendering
//!
//! Handlebars-based rendering of the claim letter and its appendix from a
//! [`LetterRecord`]. Templates are plain text; the docx layout of the legacy
//! system is out of scope, the prose is not.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde_json::json;
use std::collections::HashMap;

use pretenza_models::{LetterRecord, OverdueCategory};
use pretenza_utils::config::LettersConfig;

use crate::words::amount_in_words;

/// Letter template definition
#[derive(Debug, Clone)]
pub struct LetterTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub body_template: String,
}

/// One rendered output document, ready to be written to the generated dir.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub body: String,
}

/// Template engine
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, LetterTemplate>,
}

const CLAIM_LETTER_TEMPLATE: &str = "claim_letter";
const APPENDIX_TEMPLATE: &str = "appendix";

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Plain-text output: the contractor names carry literal quotes.
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut engine = Self {
            handlebars,
            templates: HashMap::new(),
        };

        engine.register_builtin_templates();

        engine
    }

    fn register_builtin_templates(&mut self) {
        let claim_letter = LetterTemplate {
            id: CLAIM_LETTER_TEMPLATE.to_string(),
            name: "Претензионное письмо".to_string(),
            description: "Письмо контрагенту о просроченных поставках с расчетом пени".to_string(),
            body_template: r#"№ ____________
Кас.: Претензионная работа по договору поставки

Уважаемый партнер!

Настоящим сообщаем, что между «{{entity_name}}» и {{legal_form}} «{{contractor_name}}» (далее – «{{short_name}}») заключен договор поставки № {{reg_number}} от {{reg_date}} (далее – Договор поставки). В соответствии с Договором поставки сторонами подписана Спецификация № {{order_id}} от {{specification_date}} (далее – спецификация), согласно которой «{{short_name}}» обязуется в срок до {{planned_date}} поставить товары на сумму {{total_amount}} ({{total_amount_words}}), а «{{entity_name}}» - оплатить указанные товары в течение {{payment_term_days}} календарных дней с момента их передачи (Приложение № 1 к настоящему письму).

По состоянию на {{current_date}} товары в количестве {{position_count}} позиций на {{total_amount}} ({{total_amount_words}}) в месте поставки {{delivery_state_phrase}}, что является нарушением п. 4.1 Договора поставки. На основании п. 8.3. Договора поставки сумма пени на текущий момент по просроченным позициям составляет {{total_penalty}} ({{total_penalty_words}}) и рассчитывается следующим образом:

0,1 (Ноль целых и одна десятая) % стоимости непоставленного в срок товара, или товара, в отношении которого не выполнены требования, предъявленные Покупателем в соответствии с пунктами 7.5. и 7.10.5. договора, за каждый день просрочки в течение первых двух недель, а в случае дальнейшей просрочки - в размере 0,5 (Ноль целых и пять десятых) % стоимости такого товара за каждый день просрочки.

Учитывая изложенное, убедительно просим Вас ускорить исполнение обязательств, принятых по Договору поставки, в части своевременной отгрузки товаров в целях недопущения увеличения суммы пени по позициям товара согласно Приложению № 1 к настоящему письму.

Приложения по тексту:
1) Спецификация № {{reg_number}} от {{reg_date}} (в 1 экз.);
2) Приложение № 1 — перечень просроченных позиций (всего {{position_count}} поз., в 1 экз.)

С уважением,

[_____________________] [_____________]
(наименование должности уполномоченного лица) (подпись, Ф.И.О.)

Исп. [______________________________________]
Контактный т. [_______________________________]
"#
            .to_string(),
        };

        self.templates.insert(claim_letter.id.clone(), claim_letter);

        let appendix = LetterTemplate {
            id: APPENDIX_TEMPLATE.to_string(),
            name: "Приложение к письму".to_string(),
            description: "Перечень просроченных позиций по заказу".to_string(),
            body_template: r#"Приложение № 1 к письму
Спецификация по заказу № {{order_id}}

Номер заказа: {{order_id}}
Контрагент: {{contractor_name}}
Статус позиций: {{category}}
Количество просроченных позиций: {{position_count}}
На сумму: {{total_amount}} ({{total_amount_words}})
Сумма пени: {{total_penalty}} ({{total_penalty_words}})

№ п/п | Наименование | Ед. изм. | Кол-во | Сумма | Дней просрочки | Пени
{{#each positions}}{{item_number}} | {{item_name}} | {{unit}} | {{quantity}} | {{amount}} | {{days_overdue}} | {{penalty}}
{{/each}}"#
                .to_string(),
        };

        self.templates.insert(appendix.id.clone(), appendix);
    }

    /// Get template by ID
    pub fn get_template(&self, template_id: &str) -> Option<&LetterTemplate> {
        self.templates.get(template_id)
    }

    /// List all templates
    pub fn list_templates(&self) -> Vec<&LetterTemplate> {
        self.templates.values().collect()
    }

    /// Render one template with already-built variables.
    pub fn render(&self, template_id: &str, variables: &serde_json::Value) -> Result<String> {
        let template = self
            .templates
            .get(template_id)
            .context("Template not found")?;

        self.handlebars
            .render_template(&template.body_template, variables)
            .with_context(|| format!("Failed to render template '{}'", template_id))
    }

    /// Render the letter and appendix for one record.
    ///
    /// `index` is the 1-based sequence number used in the output filenames;
    /// `now` is the same reference date the aggregation ran with.
    pub fn render_documents(
        &self,
        record: &LetterRecord,
        index: usize,
        now: NaiveDate,
        letters: &LettersConfig,
    ) -> Result<Vec<RenderedDocument>> {
        let variables = self.record_variables(record, now, letters);

        let letter_body = self.render(CLAIM_LETTER_TEMPLATE, &variables)?;
        let appendix_body = self.render(APPENDIX_TEMPLATE, &variables)?;

        let stem = format!(
            "{}_{}_{}",
            index,
            sanitize_component(&record.short_name),
            sanitize_component(&record.order_id)
        );

        Ok(vec![
            RenderedDocument {
                filename: format!("letter_{}.txt", stem),
                body: letter_body,
            },
            RenderedDocument {
                filename: format!("appendix_{}.txt", stem),
                body: appendix_body,
            },
        ])
    }

    fn record_variables(
        &self,
        record: &LetterRecord,
        now: NaiveDate,
        letters: &LettersConfig,
    ) -> serde_json::Value {
        let delivery_state_phrase = match record.category {
            OverdueCategory::NotDelivered => "отсутствуют",
            OverdueCategory::DeliveredLate => "поступили с просрочкой",
        };

        let positions: Vec<serde_json::Value> = record
            .positions
            .iter()
            .map(|p| {
                json!({
                    "item_number": p.item_number,
                    "item_name": p.item_name,
                    "unit": p.unit,
                    "quantity": p.quantity,
                    "amount": format_money(p.amount),
                    "days_overdue": p.days_overdue,
                    "penalty": format_money(p.penalty),
                })
            })
            .collect();

        json!({
            "order_id": record.order_id,
            "contractor_name": record.contractor_name,
            "short_name": record.short_name,
            "legal_form": record.legal_form,
            "entity_name": record.entity_name,
            "reg_number": record.reg_number,
            "reg_date": record.reg_date.map(format_date).unwrap_or_default(),
            "planned_date": format_date(record.planned_date),
            "specification_date": letters.specification_date,
            "payment_term_days": letters.payment_term_days,
            "current_date": format_date(now),
            "category": record.category.description(),
            "delivery_state_phrase": delivery_state_phrase,
            "position_count": record.position_count,
            "total_amount": format_money(record.total_amount),
            "total_amount_words": amount_in_words(record.total_amount),
            "total_penalty": format_money(record.total_penalty),
            "total_penalty_words": amount_in_words(record.total_penalty),
            "positions": positions,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Filename-safe version of a name or order id.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
