//! Fixed farmer-facing messages for turns that are not answered from evidence.
//!
//! Decline messages are looked up by the template identifier attached to a
//! classification; the classifier itself never sees this text. Languages
//! without a translation fall back to English.

/// English and Gujarati text for one template.
struct Message {
    id: &'static str,
    en: &'static str,
    gu: &'static str,
}

const NOT_FOUND_ID: &str = "answer.not_found";

const MESSAGES: &[Message] = &[
    Message {
        id: "decline.non_agricultural",
        en: "I can only help with questions about farming, livestock and rural livelihoods. Please ask me an agriculture-related question.",
        gu: "હું ફક્ત ખેતી, પશુપાલન અને ગ્રામીણ આજીવિકા સંબંધિત પ્રશ્નોમાં મદદ કરી શકું છું. કૃપા કરીને ખેતી સંબંધિત પ્રશ્ન પૂછો.",
    },
    Message {
        id: "decline.external_reference",
        en: "I answer from verified agricultural advisories, not from films, stories or other media. Please ask about the farming practice itself.",
        gu: "હું ફિલ્મો, વાર્તાઓ કે અન્ય માધ્યમોના આધારે નહીં, પણ ચકાસાયેલ કૃષિ માહિતીના આધારે જવાબ આપું છું. કૃપા કરીને ખેતી પદ્ધતિ વિશે સીધો પ્રશ્ન પૂછો.",
    },
    Message {
        id: "decline.compound_mixed",
        en: "Your question mixes farming with other topics. I can help with the farming part; please ask it on its own.",
        gu: "તમારા પ્રશ્નમાં ખેતી સાથે અન્ય વિષયો પણ છે. હું ખેતી સંબંધિત ભાગમાં મદદ કરી શકું છું; કૃપા કરીને તે અલગથી પૂછો.",
    },
    Message {
        id: "decline.unsupported_language",
        en: "I can reply only in English or Gujarati. Please choose one of these languages.",
        gu: "હું ફક્ત અંગ્રેજી અથવા ગુજરાતીમાં જવાબ આપી શકું છું. કૃપા કરીને આ બેમાંથી એક ભાષા પસંદ કરો.",
    },
    Message {
        id: "decline.cultural_sensitive",
        en: "Religious and community practices differ from family to family. I can share scientific farming guidance on this topic instead.",
        gu: "ધાર્મિક અને સામુદાયિક પરંપરાઓ દરેક પરિવારમાં અલગ હોય છે. હું આ વિષય પર વૈજ્ઞાનિક ખેતી માર્ગદર્શન આપી શકું છું.",
    },
    Message {
        id: "decline.unsafe_illegal",
        en: "I cannot help with banned or illegal practices. Please consult your local agriculture officer for approved alternatives.",
        gu: "હું પ્રતિબંધિત અથવા ગેરકાયદેસર પદ્ધતિઓમાં મદદ કરી શકતો નથી. માન્ય વિકલ્પો માટે કૃપા કરીને તમારા સ્થાનિક ખેતીવાડી અધિકારીનો સંપર્ક કરો.",
    },
    Message {
        id: "decline.political",
        en: "I do not take positions on political parties or leaders. I can help with farming schemes and practices.",
        gu: "હું રાજકીય પક્ષો કે નેતાઓ અંગે કોઈ અભિપ્રાય આપતો નથી. હું ખેતી યોજનાઓ અને પદ્ધતિઓ વિશે મદદ કરી શકું છું.",
    },
    Message {
        id: "decline.role_override",
        en: "I am an agricultural advisory assistant and cannot change my role. How can I help with your farm today?",
        gu: "હું કૃષિ સલાહકાર સહાયક છું અને મારી ભૂમિકા બદલી શકતો નથી. આજે તમારી ખેતીમાં હું કેવી રીતે મદદ કરી શકું?",
    },
    Message {
        id: NOT_FOUND_ID,
        en: "I could not find verified information about this in the available advisories. Please contact your nearest Krishi Vigyan Kendra or agriculture officer.",
        gu: "ઉપલબ્ધ માહિતીમાં આ વિશે ચકાસાયેલ માહિતી મળી નથી. કૃપા કરીને નજીકના કૃષિ વિજ્ઞાન કેન્દ્ર અથવા ખેતીવાડી અધિકારીનો સંપર્ક કરો.",
    },
];

fn localized(message: &Message, language: &str) -> &'static str {
    if language.eq_ignore_ascii_case("gu") {
        message.gu
    } else {
        message.en
    }
}

/// Decline text for a template identifier, or `None` for unknown ids.
pub fn decline_message(template_id: &str, language: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .filter(|m| m.id != NOT_FOUND_ID)
        .find(|m| m.id == template_id)
        .map(|m| localized(m, language))
}

/// Text for an approved question with no supporting evidence.
pub fn not_found_message(language: &str) -> &'static str {
    MESSAGES
        .iter()
        .find(|m| m.id == NOT_FOUND_ID)
        .map(|m| localized(m, language))
        .unwrap_or("Information not available.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_decline_has_both_languages() {
        for message in MESSAGES {
            assert!(!message.en.is_empty(), "{} missing English", message.id);
            assert!(!message.gu.is_empty(), "{} missing Gujarati", message.id);
            assert_ne!(message.en, message.gu);
        }
    }

    #[test]
    fn test_decline_lookup() {
        let en = decline_message("decline.political", "en").unwrap();
        assert!(en.contains("political"));

        let gu = decline_message("decline.political", "gu").unwrap();
        assert!(gu.contains("રાજકીય"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(
            decline_message("decline.unsafe_illegal", "ta"),
            decline_message("decline.unsafe_illegal", "en")
        );
    }

    #[test]
    fn test_not_found_is_not_a_decline() {
        assert!(decline_message(NOT_FOUND_ID, "en").is_none());
        assert!(decline_message("decline.unknown", "en").is_none());
        assert!(not_found_message("gu").contains("કૃષિ વિજ્ઞાન કેન્દ્ર"));
    }
}
