#[cfg(test)]
mod integration_tests {

    use crate::identifier::LanguageIdentifier;
    use crate::lang::UNKNOWN;

    const ARABIC: &str = "هذه فقرة عادية تماما من النص العربي، طويلة بما يكفي لتجاوز \
        الحد الأدنى من البايتات، مع كلمات شائعة ولا توجد بها أي وسوم على الإطلاق.";

    const HEBREW: &str = "זוהי פסקה רגילה לחלוטין של טקסט עברי, ארוכה מספיק כדי לעבור \
        את סף הבתים המינימלי, עם מילים נפוצות ללא שום תגיות בכלל.";

    const KOREAN: &str = "이것은 지극히 평범한 한국어 텍스트 단락으로, 최소 바이트 \
        기준을 넘길 만큼 충분히 길고, 흔한 단어들로 이루어져 있습니다.";

    const JAPANESE: &str = "これはごく普通の日本語の段落であり、最小バイトのしきい値を \
        超えるのに十分な長さがあり、よくある言葉で書かれています。";

    const CHINESE: &str = "这是一段完全普通的中文文本，长度足以超过最低字节数的门槛，\
        其中包含常见的词语，并且完全没有任何标记。";

    #[test]
    fn distinct_scripts_resolve_to_their_languages() {
        let mut id = LanguageIdentifier::new();
        for (text, code) in [
            (ARABIC, "ar"),
            (HEBREW, "he"),
            (KOREAN, "ko"),
            (CHINESE, "zh"),
        ] {
            let r = id.find_language(text.as_bytes());
            assert_eq!(r.language, code, "text {text:?}");
            assert!(r.is_reliable, "{code} probability {}", r.probability);
        }
    }

    #[test]
    fn japanese_beats_chinese_on_kana() {
        let mut id = LanguageIdentifier::new();
        let r = id.find_language(JAPANESE.as_bytes());
        assert_eq!(r.language, "ja");
    }

    #[test]
    fn html_page_classifies_by_its_prose() {
        let mut id = LanguageIdentifier::new();
        let page = format!(
            "<!DOCTYPE html><html><head><title>x</title>\
             <script>function f() {{ return \"not prose\"; }}</script>\
             <style>body {{ color: red; }}</style></head>\
             <body><!-- nav --><div class=\"main\"><p>{KOREAN}</p></div></body></html>"
        );
        let r = id.find_language(page.as_bytes());
        assert_eq!(r.language, "ko");
        assert!(r.is_reliable);
    }

    #[test]
    fn instance_is_reusable_across_calls() {
        let mut id = LanguageIdentifier::new();
        let first = id.find_language(ARABIC.as_bytes());
        id.find_language(b"");
        id.find_language(CHINESE.as_bytes());
        let again = id.find_language(ARABIC.as_bytes());
        assert_eq!(first, again);
    }

    #[test]
    fn top_n_orders_by_byte_mass() {
        let mut id = LanguageIdentifier::new();
        let text = format!("{CHINESE} {ARABIC} {CHINESE}");
        let results = id.find_top_n_languages(text.as_bytes(), 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].language, "zh");
        assert_eq!(results[1].language, "ar");
        assert_eq!(results[2].language, UNKNOWN);
        assert!(results[0].proportion > results[1].proportion);
    }

    #[test]
    fn top_n_skips_below_minimum_spans() {
        let mut id = LanguageIdentifier::new();
        // The Hebrew fragment is far below the minimum span size and
        // must be skipped outright, not scored.
        let text = format!("{ARABIC} שלום");
        let results = id.find_top_n_languages(text.as_bytes(), 2);
        assert_eq!(results[0].language, "ar");
        assert_eq!(results[1].language, UNKNOWN);
        assert!((results[0].proportion - 1.0).abs() < 1e-6);
    }

    #[test]
    fn garbage_bytes_never_panic() {
        let mut id = LanguageIdentifier::new();
        let r = id.find_language(&[0xFF; 512]);
        assert_eq!(r.language, UNKNOWN);
        let results = id.find_top_n_languages(&[0x80, 0xC0, 0xFE, 0x00], 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn oversized_input_is_clamped() {
        let mut id = LanguageIdentifier::new();
        // 40 KiB of Arabic; only the first 10 KB are ever examined.
        let big = ARABIC.repeat(180);
        let r = id.find_language(big.as_bytes());
        assert_eq!(r.language, "ar");
        assert!(r.is_reliable);
    }
}
