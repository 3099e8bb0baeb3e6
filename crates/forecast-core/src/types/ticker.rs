//! 티커 정규화.

/// 티커에서 파일 이름 등에 쓸 수 있는 결정적 키를 만듭니다.
///
/// 소문자로 바꾸고 영숫자가 아닌 문자는 모두 `_`로 치환합니다.
/// 예: `"KC=F"` → `"kc_f"`, `"DX-Y.NYB"` → `"dx_y_nyb"`.
pub fn ticker_key(ticker: &str) -> String {
    ticker
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
