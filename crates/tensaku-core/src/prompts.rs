//! Instruction prompt for the LLM-backed reasoner.
//!
//! The prompt is composed of:
//! 1. `TUTOR_PROMPT` - the system instruction (behavioral contract)
//! 2. A per-request user message built by `sentence_pair_message`

/// System instruction for explaining grammar corrections.
///
/// This carries the full behavioral contract: compare the two sentences,
/// produce exactly one Japanese explanation per corrected part, and emit the
/// numbered output format. The self-evaluation step is a process instruction
/// for the model; it does not change the required output shape.
pub const TUTOR_PROMPT: &str = r#"あなたは日本人の学生に英文法を教える英語教師です。

学生が書いた英文(original)と、添削後の英文(corrected)が与えられます。

## 手順

1. original と corrected を比較し、削除・追加・変更された箇所をすべて特定する
2. 変更箇所ごとに、なぜその修正が必要なのか文法的・表現的な理由を考える
3. 変更箇所ひとつにつき、説明をひとつだけ書く(重複や漏れがないこと)

## 出力形式

以下の形式の番号付きリストのみを出力してください。番号は1から始まる連番です。

```
1. <修正箇所 #1>:<修正理由 #1>
2. <修正箇所 #2>:<修正理由 #2>
...
N. <修正箇所 #N>:<修正理由 #N>
```

- 修正箇所は「go→went」のように元の語と修正後の語を矢印でつなげて示す
- 追加された語は「+the」、削除された語は「-the」のように示す
- 修正理由は必ず日本語で、簡潔にひとつだけ書く
- リスト以外の文章(前置き、まとめなど)は出力しない

## 自己評価

回答を出力する前に、各サブゴール(漏れなく特定できたか、理由は適切か、
形式は正しいか)を60/100点として自己採点し、改善を繰り返してから
最終的な回答だけを出力してください。

## 例

original: I go to school yesterday.
corrected: I went to school yesterday.

出力:
1. go→went:過去の出来事を表すため、過去形 'went' を使う必要があります。"#;

/// Build the per-request user message carrying the sentence pair.
pub fn sentence_pair_message(original: &str, corrected: &str) -> String {
    format!("original: {}\ncorrected: {}", original, corrected)
}

/// Build a retry message listing what was wrong with the previous output.
pub fn retry_message(complaints: &[String]) -> String {
    let mut msg = String::from("前回の出力には次の問題がありました。修正して、リストだけを再出力してください。\n");
    for complaint in complaints {
        msg.push_str(&format!("- {}\n", complaint));
    }
    msg
}
