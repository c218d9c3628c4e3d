use std::sync::Arc;

use skillquest_common::actions::{PROFILE_COMPLETION, PROFILE_UPDATE};
use skillquest_common::{
    ActionEvent, Employee, EmployeeUpdate, EmployeeWithSkills, NewEmployee, ProfileCompletion,
    Result,
};
use skillquest_engine::EventDispatcher;
use skillquest_store::EmployeeStore;
use tracing::info;

use super::completion::ProfileCompletionCalculator;

/// Employee profile operations. Profile changes feed quest progress through
/// the dispatcher; dispatch never fails the operation itself.
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    dispatcher: Arc<EventDispatcher>,
    completion: Arc<ProfileCompletionCalculator>,
}

impl EmployeeService {
    pub fn new(
        store: Arc<dyn EmployeeStore>,
        dispatcher: Arc<EventDispatcher>,
        completion: Arc<ProfileCompletionCalculator>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            completion,
        }
    }

    pub async fn create_employee(&self, new: &NewEmployee) -> Result<Employee> {
        new.validate()?;
        let employee = self.store.create_employee(new).await?;
        info!(employee_id = employee.id, "Employee created");
        Ok(employee)
    }

    pub async fn get_employee(&self, employee_id: i64) -> Result<EmployeeWithSkills> {
        self.store.get_employee_with_skills(employee_id).await
    }

    pub async fn update_employee(
        &self,
        employee_id: i64,
        update: &EmployeeUpdate,
    ) -> Result<Employee> {
        update.validate()?;

        let employee = self.store.update_employee(employee_id, update).await?;
        info!(employee_id, "Employee updated");

        self.dispatcher
            .dispatch(&ActionEvent::new(employee_id, PROFILE_UPDATE, 1))
            .await;
        // The count is recomputed by the completion handler.
        self.dispatcher
            .dispatch(&ActionEvent::new(employee_id, PROFILE_COMPLETION, 0))
            .await;

        Ok(employee)
    }

    /// Current completion score; also feeds it to completion quests.
    pub async fn calculate_completion(&self, employee_id: i64) -> Result<ProfileCompletion> {
        let completion_percentage = self.completion.profile_completion(employee_id).await?;
        self.dispatcher
            .dispatch(&ActionEvent::new(
                employee_id,
                PROFILE_COMPLETION,
                completion_percentage,
            ))
            .await;
        Ok(ProfileCompletion {
            completion_percentage,
        })
    }
}
