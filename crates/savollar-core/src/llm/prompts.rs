//! Prompt templates and free-text detection heuristics
//!
//! Classification and "not found" detection are string heuristics over
//! free-text model output. They live here, each behind a single function,
//! so they can later be swapped for structured output without touching the
//! pipeline.

use crate::search::RankedCandidate;

/// Token whose presence in the classifier's output marks a question
pub const QUESTION_TOKEN: &str = "SAVOL";

/// Disclaimer attached to every answer not grounded in the corpus
pub const KNOWLEDGE_DISCLAIMER: &str = "Diqqat: bu javob ma'lumotlar bazasidagi manbalardan emas, \
     sun'iy intellekt bilimidan olingan. Muhim diniy masalalarda \
     mutaxassis ulamolarga murojaat qiling.";

/// Phrases the grounded answer is scanned for; any hit means the model
/// could not answer from the supplied context.
const NOT_FOUND_PHRASES: &[&str] = &[
    "topilmadi",
    "mavjud emas",
    "ma'lumot yo'q",
    "javob yo'q",
];

/// Case-insensitive scan for the fixed "not found" phrases
pub fn contains_not_found(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    NOT_FOUND_PHRASES.iter().any(|p| lower.contains(p))
}

/// Classification prompt: is this message a question needing retrieval?
pub fn classification_prompt(message: &str) -> String {
    format!(
        r#"Foydalanuvchi xabarini tahlil qil. Bu islomiy savol yoki ma'lumot so'rayotgan savolmi?

Xabar: "{message}"

Agar bu:
- Islomiy savol (namoz, ro'za, zakot, haj, nikoh, halol-harom va h.k.)
- Ma'lumot so'rayotgan savol
- Diniy masala haqida so'rov
bo'lsa "SAVOL" deb javob ber.

Agar bu:
- Salomlashish (salom, assalomu alaykum)
- Xayrlashish (xo'sh, hayr, ko'rishguncha)
- Oddiy suhbat (rahmat, ok, ha, yo'q, yaxshi)
- Savol emas, shunchaki gap
bo'lsa "SUHBAT" deb javob ber.

Faqat bitta so'z bilan javob ber: SAVOL yoki SUHBAT"#
    )
}

/// Keyword extraction prompt requesting structured JSON output.
///
/// The corpus is indexed in Cyrillic Uzbek, so keywords and the rewritten
/// query must come back in that orthography, with loanwords mapped to their
/// standard spelled form.
pub fn keyword_extraction_prompt(message: &str) -> String {
    format!(
        r#"Foydalanuvchi savolidan qidiruv uchun kalit so'zlarni ajratib ol.

Savol: "{message}"

Qoidalar:
1. Kalit so'zlarni kirill alifbosida yoz (korpus kirill yozuvida indekslangan)
2. Lotincha yozilgan diniy atamalarni standart kirill imlosiga o'tkaz
   (masalan: "namoz" -> "намоз", "ro'za" -> "рўза")
3. primary_keywords: savolning asosiy atamalari (2-5 ta)
4. related_keywords: sinonim va yaqin atamalar (0-5 ta)
5. rewritten_query: savolning kirill yozuvidagi to'liq qayta yozilgan shakli

Faqat quyidagi JSON formatda javob ber:
{{"primary_keywords": ["..."], "related_keywords": ["..."], "rewritten_query": "..."}}"#
    )
}

/// System instruction for grounded answer composition
pub fn grounded_system_prompt() -> &'static str {
    r#"Sen islomiy savollarga javob beruvchi yordamchisan.
Sening vazifang foydalanuvchi savoliga berilgan manbalar asosida aniq va to'liq javob berish.

Qoidalar:
1. Faqat berilgan manbalar asosida javob ber
2. Agar manbalardan javob topilmasa, "Bu savol bo'yicha ma'lumot topilmadi" deb ayt.
3. Javobni o'zbek tilida ber
4. Qisqa va aniq javob ber, lekin muhim ma'lumotlarni qoldirma
5. Manbalarga ishora qilma, shunchaki javob ber"#
}

/// User message for grounded composition: context block plus the question.
/// Candidates appear in their ranked order.
pub fn grounded_user_prompt(query: &str, candidates: &[RankedCandidate]) -> String {
    let context = candidates
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            format!(
                "[Manba {}]\nSavol: {}\nJavob: {}\n",
                i + 1,
                ranked.candidate.title,
                ranked.candidate.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!("Manbalar:\n{context}\n\nFoydalanuvchi savoli: {query}")
}

/// Prompt for conversational replies (greetings, small talk)
pub fn conversational_prompt(message: &str) -> String {
    format!(
        r#"Sen do'stona yordamchisan. Foydalanuvchi senga salomlashdi yoki oddiy gap aytdi.
Unga qisqa va do'stona javob ber. O'zbek tilida javob ber.

Foydalanuvchi: {message}

Qisqa javob ber (1-2 jumla). Agar salomlashsa, salomlash va yordam taklif qil. Agar xayrlashsa, xayrlashtir."#
    )
}

/// System instruction for the knowledge fallback (no corpus grounding)
pub fn fallback_system_prompt() -> &'static str {
    r#"Sen islomiy savollarga javob beruvchi yordamchisan.
Foydalanuvchi savoliga o'z bilimingdan foydalanib javob ber.

Qoidalar:
1. Javobni o'zbek tilida ber
2. Qisqa va aniq javob ber
3. Aniq bilmagan narsang haqida taxmin qilma
4. Fiqhiy masalalarda turli mazhablar borligini unutma"#
}
