//! Evaluation rubrics and request assembly
//!
//! Each mode has one fixed rubric. The rubrics are content, not logic: they are
//! sent to the model unmodified, and the score labels they ask for are the ones
//! [`crate::scoring`] looks for.

use crate::error::{CoachError, Result};
use crate::types::EvaluationMode;
use image::DynamicImage;

/// Rubric for a single original illustration
pub const STANDARD_RUBRIC: &str = r#"あなたはプロのイラストレーターであり、イラストの批評家です。
アップロードされたイラストを分析し、以下の項目に従って詳細なレビューと採点を行ってください。
# 評価項目
* 総合評価 (100点満点): 全体的な完成度を点数で評価してください。
* 構図: キャラクターの配置、背景とのバランス、視線誘導など。
* デッサン: 人体のプロポーション、パース、形の正確さなど。
* 色彩: 色の組み合わせ、塗り方、光と影の表現など。
* 魅力と独創性: イラスト全体の魅力、オリジナリティ、コンセプトなど。
# アドバイス
上記の評価項目を踏まえ、このイラストがさらに良くなるための、具体的で実践的なアドバイスを初心者にわかるように、優しい口調で教えてください。
"#;

/// Rubric comparing a reference illustration with the student's copy
pub const COPY_RUBRIC: &str = r#"あなたは非常に優れたイラストの先生です。
今から2枚の画像を見せます。1枚目は「お手本」、2枚目は生徒がそれを「模写した絵」です。
2枚を詳細に比較し、以下の項目について評価とアドバイスをしてください。
# 評価項目
* 再現度 (100点満点): お手本をどれだけ忠実に再現できているかを点数で評価してください。
* 形の捉え方: 全体的なシルエットやパーツの形の正確さについて評価してください。お手本と大きく違う部分を具体的に指摘してください。
* 線の正確さ: 線の硬さや柔らかさ、勢いなど、線の質がお手本と比べてどうかを評価してください。
* 色の再現性: 使われている色がお手本の印象と近いか、塗り方の再現度はどうかを評価してください。
# 上達へのアドバイス
上記の評価を踏まえ、この生徒の模写がもっとお手本に近づくためには、どこを重点的に練習・修正すれば良いか、具体的で実践的なアドバイスを初心者にわかるように、優しい口調で教えてください。
"#;

/// Rubric comparing official character material with a fan work
pub const DERIVATIVE_RUBRIC: &str = r#"あなたは、アニメやゲームのキャラクターグッズを監修するプロの編集者であり、熱心なファンでもあります。
今から2枚の画像を見せます。1枚目は「キャラクターの公式資料(お手本)」、2枚目はファンが描いた「二次創作イラスト」です。
ファンとしての愛情ある視点と、プロとしての厳しい視点の両方から、2枚を詳細に比較し、以下の項目について評価とアドバイスをしてください。
# 評価項目
* キャラクター再現度 (100点満点): 髪型、顔のパーツ、表情など、そのキャラクター「らしさ」がどれだけ再現できているかを点数で評価してください。
* デザインの正確性: 衣装やアクセサリー、持ち物などのデザインがお手本に忠実か、細部まで描き込まれているかを評価してください。
* 画風とアレンジ: あなたの独自の画風で描かれていますね。そのアレンジが、キャラクターの魅力を損なわずに新しい魅力を引き出せているかを評価してください。
* キャラクターへの愛: イラスト全体から、あなたがこのキャラクターをどれだけ好きで、理解しているかが伝わってきます。その「愛」の深さを評価してください。
# 上達へのアドバイス
上記の評価を踏まえ、この二次創作イラストが、ファンとして「もっと解釈が深まる」、あるいは「もっと多くの人に魅力が伝わる」作品になるためにはどうすれば良いか、具体的で愛のあるアドバイスを、優しい口調で教えてください。
"#;

/// The fixed rubric for a mode
pub fn rubric(mode: EvaluationMode) -> &'static str {
    match mode {
        EvaluationMode::StandardScoring => STANDARD_RUBRIC,
        EvaluationMode::CopyScoring => COPY_RUBRIC,
        EvaluationMode::DerivativeWorkScoring => DERIVATIVE_RUBRIC,
    }
}

/// Label of the headline score, as shown next to a recorded result
pub fn score_label(mode: EvaluationMode) -> &'static str {
    match mode {
        EvaluationMode::StandardScoring => "スコア",
        EvaluationMode::CopyScoring => "再現度",
        EvaluationMode::DerivativeWorkScoring => "キャラクター再現度",
    }
}

/// Prompt plus images, ready for the generation API
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub mode: EvaluationMode,
    pub prompt: &'static str,
    /// `[reference, submission]` for comparison modes, `[submission]` otherwise
    pub images: Vec<DynamicImage>,
}

impl EvaluationRequest {
    /// The judged image (always the last one)
    pub fn submission(&self) -> Option<&DynamicImage> {
        self.images.last()
    }
}

/// Assembles an [`EvaluationRequest`] for one mode
#[derive(Debug, Clone)]
pub struct EvaluationRequestBuilder {
    mode: EvaluationMode,
    reference: Option<DynamicImage>,
    submission: Option<DynamicImage>,
}

impl EvaluationRequestBuilder {
    pub fn new(mode: EvaluationMode) -> Self {
        Self {
            mode,
            reference: None,
            submission: None,
        }
    }

    /// The model illustration (comparison modes only)
    pub fn reference(mut self, image: DynamicImage) -> Self {
        self.reference = Some(image);
        self
    }

    /// The user's illustration being judged
    pub fn submission(mut self, image: DynamicImage) -> Self {
        self.submission = Some(image);
        self
    }

    pub fn build(self) -> Result<EvaluationRequest> {
        let submission = self.submission.ok_or_else(|| {
            CoachError::InvalidInput(format!("{} mode needs a submission image", self.mode))
        })?;

        let images = match (self.mode.requires_reference(), self.reference) {
            (true, Some(reference)) => vec![reference, submission],
            (true, None) => {
                return Err(CoachError::InvalidInput(format!(
                    "{} mode needs a reference image",
                    self.mode
                )))
            }
            (false, Some(_)) => {
                return Err(CoachError::InvalidInput(format!(
                    "{} mode takes a single image, but a reference was supplied",
                    self.mode
                )))
            }
            (false, None) => vec![submission],
        };

        Ok(EvaluationRequest {
            mode: self.mode,
            prompt: rubric(self.mode),
            images,
        })
    }
}
