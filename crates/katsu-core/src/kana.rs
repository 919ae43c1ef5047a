//! Kana-row arithmetic for sound-change endings.

/// Map a kana character to the e-row character of its consonant row
/// (か→け, ご→げ, ッ→テ). Small vowel kana map to the small e-row
/// counterpart. Returns `None` for anything outside the table, notably
/// kanji, so callers can leave such characters untouched.
pub fn e_row(c: char) -> Option<char> {
    let shifted = match c {
        // hiragana (no za row: nothing conjugates through it)
        'あ' | 'い' | 'う' | 'え' | 'お' | 'や' | 'ゆ' | 'よ' | 'わ' | 'を' | 'ん' => 'え',
        'ぁ' | 'ぃ' | 'ぅ' | 'ぇ' | 'ぉ' | 'ゃ' | 'ゅ' | 'ょ' => 'ぇ',
        'か' | 'き' | 'く' | 'け' | 'こ' => 'け',
        'が' | 'ぎ' | 'ぐ' | 'げ' | 'ご' => 'げ',
        'さ' | 'し' | 'す' | 'せ' | 'そ' => 'せ',
        'た' | 'ち' | 'つ' | 'っ' | 'て' | 'と' => 'て',
        'だ' | 'ぢ' | 'づ' | 'で' | 'ど' => 'で',
        'な' | 'に' | 'ぬ' | 'ね' | 'の' => 'ね',
        'は' | 'ひ' | 'ふ' | 'へ' | 'ほ' => 'へ',
        'ば' | 'び' | 'ぶ' | 'べ' | 'ぼ' => 'べ',
        'ぱ' | 'ぴ' | 'ぷ' | 'ぺ' | 'ぽ' => 'ぺ',
        'ま' | 'み' | 'む' | 'め' | 'も' => 'め',
        'ら' | 'り' | 'る' | 'れ' | 'ろ' => 'れ',
        // katakana
        'ア' | 'イ' | 'ウ' | 'エ' | 'オ' | 'ヤ' | 'ユ' | 'ヨ' | 'ワ' | 'ヲ' | 'ン' => 'エ',
        'ァ' | 'ィ' | 'ゥ' | 'ェ' | 'ォ' | 'ャ' | 'ュ' | 'ョ' => 'ェ',
        'カ' | 'キ' | 'ク' | 'ケ' | 'コ' => 'ケ',
        'ガ' | 'ギ' | 'グ' | 'ゲ' | 'ゴ' => 'ゲ',
        'サ' | 'シ' | 'ス' | 'セ' | 'ソ' => 'セ',
        'タ' | 'チ' | 'ツ' | 'ッ' | 'テ' | 'ト' => 'テ',
        'ダ' | 'ヂ' | 'ヅ' | 'デ' | 'ド' => 'デ',
        'ナ' | 'ニ' | 'ヌ' | 'ネ' | 'ノ' => 'ネ',
        'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => 'ヘ',
        'バ' | 'ビ' | 'ブ' | 'ベ' | 'ボ' => 'ベ',
        'パ' | 'ピ' | 'プ' | 'ペ' | 'ポ' => 'ペ',
        'マ' | 'ミ' | 'ム' | 'メ' | 'モ' => 'メ',
        'ラ' | 'リ' | 'ル' | 'レ' | 'ロ' => 'レ',
        _ => return None,
    };
    Some(shifted)
}
