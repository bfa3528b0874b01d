use super::*;

/// A disease preset whose effect is rebuilt when its parameters change.
pub struct DiseaseNode {
    disease: Disease,
    values: ValueMap,
    work_scale: f32,
    effect: Effect,
}

impl DiseaseNode {
    pub fn new(disease: Disease, values: &ValueMap) -> Result<Self, Error> {
        let values = disease.own_values(values);
        let effect = Effect::new(disease.descriptor(&values)?)?;
        Ok(DiseaseNode {
            disease,
            values,
            work_scale: 1.0,
            effect,
        })
    }

    pub fn with_work_scale(mut self, scale: f32) -> Self {
        self.work_scale = clamp_work_scale(scale);
        self.effect.set_work_scale(self.work_scale);
        self
    }

    pub fn disease(&self) -> Disease {
        self.disease
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut Effect {
        &mut self.effect
    }
}

impl Node for DiseaseNode {
    fn name(&self) -> &str {
        self.disease.key()
    }

    fn update_values(&mut self, values: &ValueMap) -> Result<(), Error> {
        let mut merged = self.values.clone();
        merged.extend(self.disease.own_values(values));
        if merged == self.values {
            return Ok(());
        }
        let effect = Effect::new(self.disease.descriptor(&merged)?)?.with_work_scale(self.work_scale);
        log::info!("[{}] parameters updated", self.disease);
        self.values = merged;
        self.effect = effect;
        Ok(())
    }

    fn process(&mut self, frame: &Frame, severity: f32) -> Result<Frame, Error> {
        self.effect.process(frame, severity)
    }

    fn reset(&mut self) {
        self.effect.reset();
    }
}
